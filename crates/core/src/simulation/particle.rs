//! Particles and their fixed-capacity trails

use crate::core_types::{GeoPoint, LevelId};

/// Ring buffer of past positions, newest first.
///
/// The buffer is always full: a fresh or reset trail repeats one point
/// `capacity` times, and each push drops the oldest point.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: Vec<GeoPoint>,
    /// Slot holding the newest point
    head: usize,
}

impl Trail {
    /// Trail of `capacity` copies of `point`.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, point: GeoPoint) -> Self {
        assert!(capacity > 0, "trail capacity must be non-zero");
        Self {
            points: vec![point; capacity],
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// Always equal to [`Trail::capacity`]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Overwrite every slot with `point`
    pub fn reset(&mut self, point: GeoPoint) {
        self.points.fill(point);
        self.head = 0;
    }

    /// Record a new newest point, dropping the oldest
    #[inline]
    pub fn push(&mut self, point: GeoPoint) {
        let capacity = self.points.len();
        self.head = (self.head + capacity - 1) % capacity;
        self.points[self.head] = point;
    }

    /// Point `age` steps back (0 = newest)
    #[inline]
    pub fn get(&self, age: usize) -> Option<&GeoPoint> {
        if age >= self.points.len() {
            return None;
        }
        self.points.get((self.head + age) % self.points.len())
    }

    pub fn newest(&self) -> &GeoPoint {
        &self.points[self.head]
    }

    pub fn oldest(&self) -> &GeoPoint {
        let capacity = self.points.len();
        &self.points[(self.head + capacity - 1) % capacity]
    }

    /// Points from newest to oldest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GeoPoint> + '_ {
        let (wrapped, from_head) = self.points.split_at(self.head);
        from_head.iter().chain(wrapped.iter())
    }
}

/// A single advected tracer
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub(crate) position: GeoPoint,
    pub(crate) level: LevelId,
    /// Horizontal speed at the last successful sample (m/s)
    pub(crate) speed: f32,
    pub(crate) trail: Trail,
}

impl Particle {
    pub(crate) fn new(level: LevelId, position: GeoPoint, trail_capacity: usize) -> Self {
        Self {
            position,
            level,
            speed: 0.0,
            trail: Trail::new(trail_capacity, position),
        }
    }

    /// Move to `position` and collapse the trail onto it
    pub(crate) fn place(&mut self, level: LevelId, position: GeoPoint) {
        self.level = level;
        self.position = position;
        self.speed = 0.0;
        self.trail.reset(position);
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn level(&self) -> LevelId {
        self.level
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}
