//! Serialization of particle trails into flat line-segment buffers
//!
//! Layout, per particle in pool order, per segment from the oldest trail
//! point to the newest:
//!
//! ```text
//! [ax, ay, az, bx, by, bz] × (trail_capacity - 1) × particle_count
//! ```
//!
//! Buffers are owned by the caller and sized once; writing never allocates.

use crate::core_types::{ColorRamp, Projection};
use crate::error::{Result, WindError};
use crate::simulation::particle::Particle;

/// Scalars per segment endpoint
const POINT_SCALARS: usize = 3;

/// Writes trail geometry and colours for a fixed trail capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailBufferBuilder {
    trail_capacity: usize,
}

impl TrailBufferBuilder {
    pub fn new(trail_capacity: usize) -> Self {
        Self { trail_capacity }
    }

    /// Line segments drawn per particle
    pub fn segments_per_particle(&self) -> usize {
        self.trail_capacity.saturating_sub(1)
    }

    /// Scalars written per particle
    pub fn scalars_per_particle(&self) -> usize {
        self.segments_per_particle() * 2 * POINT_SCALARS
    }

    /// Exact buffer length for `particle_count` particles
    pub fn required_len(&self, particle_count: usize) -> usize {
        particle_count * self.scalars_per_particle()
    }

    /// Fill `out` with projected segment endpoints.
    ///
    /// `out` must be exactly [`TrailBufferBuilder::required_len`] long.
    pub fn write_positions<P: Projection + ?Sized>(
        &self,
        particles: &[Particle],
        projection: &P,
        out: &mut [f32],
    ) -> Result<()> {
        let per_particle = self.check_len(particles.len(), out.len())?;
        if per_particle == 0 {
            return Ok(());
        }

        for (particle, chunk) in particles.iter().zip(out.chunks_exact_mut(per_particle)) {
            let mut previous: Option<[f32; 3]> = None;
            let mut segments = chunk.chunks_exact_mut(2 * POINT_SCALARS);

            for point in particle.trail().iter().rev() {
                let current = projection.project(point);
                if let Some(start) = previous {
                    let Some(segment) = segments.next() else {
                        break;
                    };
                    segment[..POINT_SCALARS].copy_from_slice(&start);
                    segment[POINT_SCALARS..].copy_from_slice(&current);
                }
                previous = Some(current);
            }
        }
        Ok(())
    }

    /// Fill `out` with one RGB triple per vertex, from each particle's speed.
    ///
    /// Same length and layout as the position buffer.
    pub fn write_colors(
        &self,
        particles: &[Particle],
        ramp: &ColorRamp,
        out: &mut [f32],
    ) -> Result<()> {
        let per_particle = self.check_len(particles.len(), out.len())?;
        if per_particle == 0 {
            return Ok(());
        }

        for (particle, chunk) in particles.iter().zip(out.chunks_exact_mut(per_particle)) {
            let rgb = ramp.color_for_speed(particle.speed()).to_array();
            for vertex in chunk.chunks_exact_mut(POINT_SCALARS) {
                vertex.copy_from_slice(&rgb);
            }
        }
        Ok(())
    }

    fn check_len(&self, particle_count: usize, actual: usize) -> Result<usize> {
        let expected = self.required_len(particle_count);
        if actual != expected {
            return Err(WindError::BufferLength { expected, actual });
        }
        Ok(self.scalars_per_particle())
    }
}
