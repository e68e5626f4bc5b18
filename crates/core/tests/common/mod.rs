//! Shared fixtures for the integration tests

#![allow(dead_code)]

use wind_trails_core::grid::ComponentGrid;
use wind_trails_core::{EngineConfig, LevelAltitudes, LevelId, Roi, WindField, WindLevel};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Small deterministic configuration
pub fn test_config(count: usize, trail_capacity: usize) -> EngineConfig {
    let mut config = EngineConfig {
        seed: Some(2024),
        ..EngineConfig::default()
    };
    config.particles.count = count;
    config.particles.trail_capacity = trail_capacity;
    config
}

/// Level spanning the default ROI with the same wind everywhere
pub fn uniform_level(id: LevelId, u: f32, v: f32, altitude: f32) -> WindLevel {
    let roi = Roi::default();
    WindLevel::new(
        id,
        vec![roi.min_lat, roi.max_lat],
        vec![roi.min_lon, roi.max_lon],
        ComponentGrid::filled(2, 2, u),
        ComponentGrid::filled(2, 2, v),
        altitude,
    )
    .unwrap()
}

/// Uniform field over `levels`, heights from the default altitude table
pub fn uniform_field(levels: &[LevelId], u: f32, v: f32) -> WindField {
    let altitudes = LevelAltitudes::default();
    levels.iter().fold(WindField::new(), |field, &id| {
        field.with_level(uniform_level(id, u, v, altitudes.altitude(id)))
    })
}

/// JSON payload with a 3×3 grid over the default ROI
pub fn uniform_payload(u: f32, v: f32) -> String {
    let roi = Roi::default();
    serde_json::json!({
        "lat": [roi.min_lat, (roi.min_lat + roi.max_lat) / 2.0, roi.max_lat],
        "lon": [roi.min_lon, (roi.min_lon + roi.max_lon) / 2.0, roi.max_lon],
        "u": [[u, u, u], [u, u, u], [u, u, u]],
        "v": [[v, v, v], [v, v, v], [v, v, v]],
    })
    .to_string()
}
