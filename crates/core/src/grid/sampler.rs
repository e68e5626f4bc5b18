//! Nearest-neighbour wind sampling
//!
//! Sampling is a pure function of the field, the ROI and the query point:
//! no caching and no side effects. Conditions that make a sample impossible
//! are returned as [`WindSample::NoData`], never as errors.

use crate::core_types::{Roi, Vec3};
use crate::grid::WindField;

/// Wind vector at a sample point (m/s)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    /// Eastward component
    pub u: f32,
    /// Northward component
    pub v: f32,
    /// Vertical component, only when the level carries one
    pub w: Option<f32>,
}

impl WindVector {
    #[must_use]
    pub const fn horizontal(u: f32, v: f32) -> Self {
        Self { u, v, w: None }
    }

    /// Horizontal speed `sqrt(u² + v²)`
    #[inline]
    #[must_use]
    pub fn horizontal_speed(&self) -> f32 {
        self.u.hypot(self.v)
    }

    /// `(u, v, w)` with a missing `w` read as zero
    #[must_use]
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.u, self.v, self.w.unwrap_or(0.0))
    }
}

/// Why a sample produced no data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoDataReason {
    /// The field holds no levels
    EmptyField,
    /// The point lies outside the ROI lat/lon bounds
    OutsideRoi,
    /// The resolved grid cell has no eastward or northward value
    MissingCell,
}

/// Outcome of a single sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindSample {
    Wind(WindVector),
    NoData(NoDataReason),
}

impl WindSample {
    #[must_use]
    pub fn wind(&self) -> Option<WindVector> {
        match self {
            WindSample::Wind(wind) => Some(*wind),
            WindSample::NoData(_) => None,
        }
    }

    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, WindSample::NoData(_))
    }
}

/// Sample the field at a 3D point.
///
/// The level whose altitude is closest to `height` is used (ties go to the
/// first level in level order), then the nearest grid cell on that level.
#[inline]
#[must_use]
pub fn sample(field: &WindField, roi: &Roi, lat: f32, lon: f32, height: f32) -> WindSample {
    let Some(level) = field.nearest_level(height) else {
        return WindSample::NoData(NoDataReason::EmptyField);
    };

    if !roi.contains_lat_lon(lat, lon) {
        return WindSample::NoData(NoDataReason::OutsideRoi);
    }

    match level.wind_at(lat, lon) {
        Some(wind) => WindSample::Wind(wind),
        None => WindSample::NoData(NoDataReason::MissingCell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::LevelId;
    use crate::grid::{ComponentGrid, WindLevel};
    use approx::assert_relative_eq;

    fn uniform_level(id: LevelId, u: f32, v: f32, altitude: f32) -> WindLevel {
        WindLevel::new(
            id,
            vec![5.0, 38.5],
            vec![66.0, 99.0],
            ComponentGrid::filled(2, 2, u),
            ComponentGrid::filled(2, 2, v),
            altitude,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_field_is_no_data() {
        let field = WindField::default();
        assert_eq!(
            sample(&field, &Roi::default(), 20.0, 80.0, 0.0),
            WindSample::NoData(NoDataReason::EmptyField)
        );
    }

    #[test]
    fn test_outside_roi_is_no_data() {
        let field = WindField::default().with_level(uniform_level(LevelId::Surface, 1.0, 1.0, 0.0));
        let roi = Roi::default();
        assert_eq!(
            sample(&field, &roi, 40.0, 80.0, 0.0),
            WindSample::NoData(NoDataReason::OutsideRoi)
        );
        assert!(sample(&field, &roi, roi.max_lat, roi.max_lon, 0.0).wind().is_some());
    }

    #[test]
    fn test_selects_nearest_level_by_height() {
        let field = WindField::default()
            .with_level(uniform_level(LevelId::Surface, 1.0, 0.0, 500_000.0))
            .with_level(uniform_level(LevelId::Hpa850, 2.0, 0.0, 1_100_000.0))
            .with_level(uniform_level(LevelId::Hpa500, 5.0, 0.0, 2_400_000.0));
        let roi = Roi::default();

        let at = |height| sample(&field, &roi, 20.0, 80.0, height).wind().unwrap().u;
        assert_eq!(at(0.0), 1.0);
        assert_eq!(at(1_000_000.0), 2.0);
        assert_eq!(at(3_000_000.0), 5.0);
        // Exactly between surface and 850: first in level order wins
        assert_eq!(at(800_000.0), 1.0);
    }

    #[test]
    fn test_speed_and_vector() {
        let wind = WindVector { u: 3.0, v: 4.0, w: None };
        assert_relative_eq!(wind.horizontal_speed(), 5.0);
        assert_eq!(wind.to_vec3(), Vec3::new(3.0, 4.0, 0.0));
    }
}
