mod common;

use approx::assert_relative_eq;
use common::{test_config, uniform_field};
use std::time::Duration;
use wind_trails_core::core_types::geodetic_to_ecef;
use wind_trails_core::{GeoPoint, LevelId, ProjectionKind, Roi, WindEngine};

#[test]
fn test_geodetic_vertices_match_trails() {
    let mut config = test_config(3, 4);
    config.projection = ProjectionKind::Geodetic;
    let mut engine = WindEngine::with_field(config, uniform_field(&[LevelId::Surface], 10.0, 0.0)).unwrap();
    engine.tick(Duration::ZERO);

    let vertices = engine.vertices();
    for (index, particle) in engine.particles().particles().iter().enumerate() {
        let chunk = &vertices[index * 18..(index + 1) * 18];
        let newest = particle.trail().newest();
        let oldest = particle.trail().oldest();

        // First endpoint is the oldest point, last endpoint the newest
        assert_eq!(&chunk[..3], &[oldest.lon, oldest.lat, oldest.height]);
        assert_eq!(&chunk[15..], &[newest.lon, newest.lat, newest.height]);
        // Segments chain: end of one is start of the next
        assert_eq!(&chunk[3..6], &chunk[6..9]);
        assert_eq!(&chunk[9..12], &chunk[12..15]);
    }
}

#[test]
fn test_ecef_vertices_lie_on_display_shell() {
    let config = test_config(10, 3);
    let altitude = config.altitudes.surface;
    let engine = WindEngine::with_field(config, uniform_field(&[LevelId::Surface], 1.0, 1.0)).unwrap();

    let first = &engine.vertices()[..3];
    let particle = &engine.particles().particles()[0];
    let expected = geodetic_to_ecef(&GeoPoint::new(
        particle.position().lat,
        particle.position().lon,
        altitude,
    ));
    assert_relative_eq!(f64::from(first[0]), expected.x, max_relative = 1e-6);
    assert_relative_eq!(f64::from(first[1]), expected.y, max_relative = 1e-6);
    assert_relative_eq!(f64::from(first[2]), expected.z, max_relative = 1e-6);
}

#[test]
fn test_frame_color_tracks_mean_speed() {
    let mut engine = WindEngine::with_field(test_config(20, 3), uniform_field(&[LevelId::Surface], 40.0, 0.0)).unwrap();
    let calm = engine.frame_color();
    assert!(calm.b > calm.r);

    engine.tick(Duration::ZERO);
    let fast = engine.frame_color();
    assert!(fast.r > fast.b, "40 m/s should map to the red end: {fast:?}");

    let colors = engine.colors();
    assert_relative_eq!(colors[0], fast.r, epsilon = 1e-5);
}

#[test]
fn test_roi_edges_in_engine_projection() {
    let mut config = test_config(1, 2);
    config.projection = ProjectionKind::Geodetic;
    let engine = WindEngine::new(config).unwrap();

    let mut edges = [0.0f32; Roi::EDGE_SCALARS];
    engine.roi_edges(&mut edges).unwrap();
    let roi = engine.roi();
    assert!(edges.chunks_exact(3).all(|v| {
        (v[0] == roi.min_lon || v[0] == roi.max_lon)
            && (v[1] == roi.min_lat || v[1] == roi.max_lat)
            && (v[2] == roi.min_height || v[2] == roi.max_height)
    }));
}
