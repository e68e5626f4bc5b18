//! Immutable multi-level wind field
//!
//! A field is built once per load and then only read. Replacement happens by
//! swapping the `Arc<WindField>` held by the store.

use crate::core_types::LevelId;
use crate::grid::WindLevel;
use std::collections::BTreeMap;

/// Wind levels keyed by [`LevelId`], iterated in level order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindField {
    levels: BTreeMap<LevelId, WindLevel>,
    time_step: Option<String>,
}

impl WindField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field tagged with the time step it was loaded for
    #[must_use]
    pub fn for_time_step(time_step: impl Into<String>) -> Self {
        Self {
            levels: BTreeMap::new(),
            time_step: Some(time_step.into()),
        }
    }

    /// Insert or replace a level, returning the previous one
    pub fn insert(&mut self, level: WindLevel) -> Option<WindLevel> {
        self.levels.insert(level.id(), level)
    }

    #[must_use]
    pub fn with_level(mut self, level: WindLevel) -> Self {
        self.insert(level);
        self
    }

    pub fn time_step(&self) -> Option<&str> {
        self.time_step.as_deref()
    }

    pub fn get(&self, id: LevelId) -> Option<&WindLevel> {
        self.levels.get(&id)
    }

    pub fn contains(&self, id: LevelId) -> bool {
        self.levels.contains_key(&id)
    }

    /// Present level ids in level order
    pub fn level_ids(&self) -> impl ExactSizeIterator<Item = LevelId> + '_ {
        self.levels.keys().copied()
    }

    pub fn levels(&self) -> impl Iterator<Item = &WindLevel> {
        self.levels.values()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level whose altitude is closest to `height`.
    ///
    /// Ties resolve to the earliest level in [`LevelId`] order. A NaN height
    /// selects the first level.
    #[inline]
    pub fn nearest_level(&self, height: f32) -> Option<&WindLevel> {
        let mut best: Option<(&WindLevel, f32)> = None;
        for level in self.levels.values() {
            let diff = (height - level.altitude_m()).abs();
            let closer = best.is_none_or(|(_, best_diff)| diff < best_diff);
            if closer {
                best = Some((level, diff));
            }
        }
        best.map(|(level, _)| level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ComponentGrid;

    fn level(id: LevelId, altitude: f32) -> WindLevel {
        WindLevel::new(
            id,
            vec![0.0],
            vec![0.0],
            ComponentGrid::filled(1, 1, 0.0),
            ComponentGrid::filled(1, 1, 0.0),
            altitude,
        )
        .unwrap()
    }

    #[test]
    fn test_levels_iterate_in_level_order() {
        let field = WindField::new()
            .with_level(level(LevelId::Hpa500, 3.0))
            .with_level(level(LevelId::Surface, 1.0))
            .with_level(level(LevelId::Hpa700, 2.0));
        let ids: Vec<_> = field.level_ids().collect();
        assert_eq!(ids, vec![LevelId::Surface, LevelId::Hpa700, LevelId::Hpa500]);
        assert_eq!(field.len(), 3);
        assert!(!field.contains(LevelId::Hpa850));
    }

    #[test]
    fn test_nearest_level_ties_go_to_first() {
        let field = WindField::new()
            .with_level(level(LevelId::Surface, 0.0))
            .with_level(level(LevelId::Hpa850, 10.0));
        assert_eq!(field.nearest_level(5.0).unwrap().id(), LevelId::Surface);
        assert_eq!(field.nearest_level(5.1).unwrap().id(), LevelId::Hpa850);
        assert_eq!(field.nearest_level(f32::NAN).unwrap().id(), LevelId::Surface);
        assert!(WindField::new().nearest_level(0.0).is_none());
    }
}
