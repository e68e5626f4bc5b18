//! Engine configuration
//!
//! Every tunable of the engine lives here. All sections deserialize with
//! `#[serde(default)]`, so a JSON document only needs the keys it overrides:
//!
//! ```json
//! { "particles": { "count": 1000 }, "seed": 7 }
//! ```

use crate::core_types::{ColorRamp, LevelAltitudes, ProjectionKind, Roi};
use crate::error::{Result, WindError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Particle pool and integration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Fixed pool size, allocated once
    pub count: usize,
    /// Points kept per trail (at least 2, so every trail has a segment)
    pub trail_capacity: usize,
    /// Integration step per accepted tick
    pub dt: f32,
    /// Degrees moved per (m/s · dt) horizontally; a visual scale, not physical
    pub horizontal_scale: f32,
    /// Metres moved per (m/s · dt) vertically when `w` is available
    pub vertical_scale: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 3500,
            trail_capacity: 18,
            dt: 0.05,
            horizontal_scale: 0.2,
            vertical_scale: 1.0,
        }
    }
}

/// Disk that particles are seeded and respawned in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub center_lat: f32,
    pub center_lon: f32,
    /// Disk radius (degrees)
    pub radius_deg: f32,
}

impl Default for SpawnConfig {
    /// Centred on the Indian subcontinent
    fn default() -> Self {
        Self {
            center_lat: 20.5937,
            center_lon: 78.9629,
            radius_deg: 10.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub roi: Roi,
    pub particles: ParticleConfig,
    pub spawn: SpawnConfig,
    /// Display altitude per level
    pub altitudes: LevelAltitudes,
    pub color: ColorRamp,
    /// Minimum wall-clock interval between accepted ticks (ms)
    pub update_interval_ms: u64,
    /// Coordinate space of the vertex buffers
    pub projection: ProjectionKind,
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roi: Roi::default(),
            particles: ParticleConfig::default(),
            spawn: SpawnConfig::default(),
            altitudes: LevelAltitudes::default(),
            color: ColorRamp::default(),
            update_interval_ms: Self::DEFAULT_UPDATE_INTERVAL_MS,
            projection: ProjectionKind::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Default update interval (~30 Hz)
    pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 33;

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check internal consistency.
    ///
    /// Rejects non-finite or non-positive steps, trails too short to form a
    /// segment, and altitude tables that fall outside the ROI height range.
    pub fn validate(&self) -> Result<()> {
        self.roi.validate()?;

        let particles = &self.particles;
        if particles.trail_capacity < 2 {
            return Err(invalid(format!(
                "trail_capacity must be at least 2, got {}",
                particles.trail_capacity
            )));
        }
        if !particles.dt.is_finite() || particles.dt <= 0.0 {
            return Err(invalid(format!("dt must be finite and positive, got {}", particles.dt)));
        }
        if !particles.horizontal_scale.is_finite() || !particles.vertical_scale.is_finite() {
            return Err(invalid("particle scales must be finite".to_string()));
        }

        let spawn = &self.spawn;
        if !spawn.center_lat.is_finite() || !spawn.center_lon.is_finite() {
            return Err(invalid("spawn centre must be finite".to_string()));
        }
        if !spawn.radius_deg.is_finite() || spawn.radius_deg < 0.0 {
            return Err(invalid(format!(
                "spawn radius must be finite and non-negative, got {}",
                spawn.radius_deg
            )));
        }

        for (level, altitude) in self.altitudes.iter() {
            if !self.roi.contains_height(altitude) {
                return Err(invalid(format!(
                    "altitude {altitude} for level {level} lies outside roi heights [{}, {}]",
                    self.roi.min_height, self.roi.max_height
                )));
            }
        }

        if !self.color.max_speed.is_finite() || self.color.max_speed <= 0.0 {
            return Err(invalid(format!(
                "color max_speed must be positive, got {}",
                self.color.max_speed
            )));
        }

        Ok(())
    }

    /// Scalars in the trail vertex buffer for this configuration
    pub fn vertex_len(&self) -> usize {
        self.particles.count * self.particles.trail_capacity.saturating_sub(1) * 6
    }
}

fn invalid(message: String) -> WindError {
    WindError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.count, 3500);
        assert_eq!(config.particles.trail_capacity, 18);
        assert_eq!(config.vertex_len(), 3500 * 17 * 6);
        assert_eq!(config.update_interval_ms, 33);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "particles": { "count": 10 }, "seed": 42, "projection": "geodetic" }"#,
        )
        .unwrap();
        assert_eq!(config.particles.count, 10);
        assert_eq!(config.particles.trail_capacity, 18);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.projection, ProjectionKind::Geodetic);
        assert_eq!(config.roi, Roi::default());
    }

    #[test]
    fn test_rejects_short_trails_and_bad_dt() {
        let mut config = EngineConfig::default();
        config.particles.trail_capacity = 1;
        assert!(matches!(config.validate(), Err(WindError::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.particles.dt = f32::NAN;
        assert!(matches!(config.validate(), Err(WindError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_altitude_outside_roi() {
        let mut config = EngineConfig::default();
        config.roi.max_height = 1_000_000.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("850"), "unexpected error: {err}");
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(WindError::Json(_))
        ));
    }
}
