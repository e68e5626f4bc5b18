mod common;

use common::{uniform_field, uniform_level};
use wind_trails_core::{
    sample, LevelAltitudes, LevelId, NoDataReason, Roi, WindField, WindSample,
};

/// Field whose `u` encodes the level, so the chosen level is observable
fn tagged_field(altitudes: &LevelAltitudes) -> WindField {
    altitudes.iter().fold(WindField::new(), |field, (id, altitude)| {
        let tag = match id {
            LevelId::Surface => 1.0,
            LevelId::Hpa850 => 850.0,
            LevelId::Hpa700 => 700.0,
            LevelId::Hpa500 => 500.0,
        };
        field.with_level(uniform_level(id, tag, 0.0, altitude))
    })
}

fn chosen(field: &WindField, height: f32) -> f32 {
    match sample(field, &Roi::default(), 20.0, 80.0, height) {
        WindSample::Wind(wind) => wind.u,
        WindSample::NoData(reason) => panic!("unexpected NoData: {reason:?}"),
    }
}

#[test]
fn test_million_metres_selects_850_with_display_base() {
    let field = tagged_field(&LevelAltitudes::default());
    assert_eq!(chosen(&field, 1_000_000.0), 850.0);
}

#[test]
fn test_million_metres_selects_850_without_display_base() {
    let field = tagged_field(&LevelAltitudes::with_base(0.0));
    assert_eq!(chosen(&field, 1_000_000.0), 850.0);
}

#[test]
fn test_selection_is_deterministic() {
    let field = tagged_field(&LevelAltitudes::default());
    let first = chosen(&field, 1_400_000.0);
    for _ in 0..100 {
        assert_eq!(chosen(&field, 1_400_000.0), first);
    }
    // Exactly halfway between 850 (1.1M) and 700 (1.7M): earlier level wins
    assert_eq!(chosen(&field, 1_400_000.0), 850.0);
}

#[test]
fn test_outside_roi_is_no_data() {
    let field = uniform_field(&LevelId::ALL, 5.0, 5.0);
    let roi = Roi::default();
    for (lat, lon) in [(4.9, 80.0), (38.6, 80.0), (20.0, 65.9), (20.0, 99.1)] {
        assert_eq!(
            sample(&field, &roi, lat, lon, 0.0),
            WindSample::NoData(NoDataReason::OutsideRoi),
            "({lat}, {lon}) should be outside"
        );
    }
}

#[test]
fn test_missing_cell_is_no_data() {
    let roi = Roi::default();
    let json = serde_json::json!({
        "lat": [roi.min_lat, roi.max_lat],
        "lon": [roi.min_lon, roi.max_lon],
        "u": [[1.0, null], [1.0, 1.0]],
        "v": [[1.0, 1.0]],
    })
    .to_string();
    let level = wind_trails_core::WindLevel::from_json(LevelId::Surface, &json, 0.0).unwrap();
    let field = WindField::new().with_level(level);

    assert!(sample(&field, &roi, roi.min_lat, roi.min_lon, 0.0).wind().is_some());
    assert_eq!(
        sample(&field, &roi, roi.min_lat, roi.max_lon, 0.0),
        WindSample::NoData(NoDataReason::MissingCell)
    );
    // Whole `v` row missing
    assert_eq!(
        sample(&field, &roi, roi.max_lat, roi.max_lon, 0.0),
        WindSample::NoData(NoDataReason::MissingCell)
    );
}
