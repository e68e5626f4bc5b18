//! Geographic primitives: points, the region of interest, and projections
//! from geodetic coordinates into renderer space.
//!
//! Globe hosts expect Earth-centred, Earth-fixed (ECEF) Cartesian coordinates on
//! the WGS84 ellipsoid:
//!
//! ```text
//! N = a / sqrt(1 - e² sin²φ)
//! x = (N + h) cos φ cos λ
//! y = (N + h) cos φ sin λ
//! z = (N (1 - e²) + h) sin φ
//! ```

use crate::error::WindError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// WGS84 ellipsoid constants
pub mod wgs84 {
    /// Semi-major axis (m)
    pub const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

    /// First eccentricity squared
    pub const ECCENTRICITY_SQ: f64 = 6.694_379_990_141_33e-3;
}

/// A geodetic position: latitude/longitude in degrees, height in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
    pub height: f32,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f32, lon: f32, height: f32) -> Self {
        Self { lat, lon, height }
    }
}

/// Region of interest: an axis-aligned lat/lon/height box.
///
/// All sampling and seeding is constrained to this box. Bounds are inclusive.
/// Heights are display heights (m), so the default box is tall enough to hold
/// every level of the default altitude table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roi {
    pub min_lat: f32,
    pub max_lat: f32,
    pub min_lon: f32,
    pub max_lon: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for Roi {
    /// India / Arabian Sea / Bay of Bengal
    fn default() -> Self {
        Self {
            min_lat: 5.0,
            max_lat: 38.5,
            min_lon: 66.0,
            max_lon: 99.0,
            min_height: 0.0,
            max_height: 3_000_000.0,
        }
    }
}

impl Roi {
    /// Number of scalars written by [`Roi::edge_vertices`] (12 edges × 2 points × 3)
    pub const EDGE_SCALARS: usize = 72;

    /// True if `(lat, lon)` lies inside the lat/lon bounds (inclusive).
    /// NaN coordinates are never inside.
    #[inline]
    #[must_use]
    pub fn contains_lat_lon(&self, lat: f32, lon: f32) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Hard-clamp a lat/lon pair onto the box
    #[inline]
    #[must_use]
    pub fn clamp_lat_lon(&self, lat: f32, lon: f32) -> (f32, f32) {
        (
            lat.clamp(self.min_lat, self.max_lat),
            lon.clamp(self.min_lon, self.max_lon),
        )
    }

    #[inline]
    #[must_use]
    pub fn clamp_height(&self, height: f32) -> f32 {
        height.clamp(self.min_height, self.max_height)
    }

    #[must_use]
    pub fn contains_height(&self, height: f32) -> bool {
        height >= self.min_height && height <= self.max_height
    }

    /// Centre of the box at its lowest height
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_lon + self.max_lon) * 0.5,
            self.min_height,
        )
    }

    /// Check that every bound is finite and each range is non-empty
    pub fn validate(&self) -> Result<(), WindError> {
        let bounds = [
            ("lat", self.min_lat, self.max_lat),
            ("lon", self.min_lon, self.max_lon),
            ("height", self.min_height, self.max_height),
        ];
        for (name, min, max) in bounds {
            if !min.is_finite() || !max.is_finite() {
                return Err(WindError::InvalidConfig(format!(
                    "roi {name} bounds must be finite, got [{min}, {max}]"
                )));
            }
            if min >= max {
                return Err(WindError::InvalidConfig(format!(
                    "roi min_{name} ({min}) must be below max_{name} ({max})"
                )));
            }
        }
        Ok(())
    }

    /// Write the 12 edges of the box as a line-segment list into `out`.
    ///
    /// `out` must hold exactly [`Roi::EDGE_SCALARS`] values. Bottom face first,
    /// then top face, then the four vertical edges.
    pub fn edge_vertices<P: Projection + ?Sized>(
        &self,
        projection: &P,
        out: &mut [f32],
    ) -> Result<(), WindError> {
        if out.len() != Self::EDGE_SCALARS {
            return Err(WindError::BufferLength {
                expected: Self::EDGE_SCALARS,
                actual: out.len(),
            });
        }

        let corners = [
            GeoPoint::new(self.min_lat, self.min_lon, self.min_height),
            GeoPoint::new(self.min_lat, self.max_lon, self.min_height),
            GeoPoint::new(self.max_lat, self.max_lon, self.min_height),
            GeoPoint::new(self.max_lat, self.min_lon, self.min_height),
            GeoPoint::new(self.min_lat, self.min_lon, self.max_height),
            GeoPoint::new(self.min_lat, self.max_lon, self.max_height),
            GeoPoint::new(self.max_lat, self.max_lon, self.max_height),
            GeoPoint::new(self.max_lat, self.min_lon, self.max_height),
        ]
        .map(|corner| projection.project(&corner));

        const EDGES: [(usize, usize); 12] = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];

        for ((a, b), segment) in EDGES.iter().zip(out.chunks_exact_mut(6)) {
            segment[..3].copy_from_slice(&corners[*a]);
            segment[3..].copy_from_slice(&corners[*b]);
        }
        Ok(())
    }
}

/// Maps a geodetic point into the renderer's coordinate space
pub trait Projection {
    fn project(&self, point: &GeoPoint) -> [f32; 3];
}

/// WGS84 Earth-centred Cartesian coordinates (metres), what globe renderers consume
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EcefProjection;

/// Plain `[lon, lat, height]` passthrough, for flat map hosts and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeodeticProjection;

/// Convert a geodetic point to ECEF, computed in double precision
#[must_use]
pub fn geodetic_to_ecef(point: &GeoPoint) -> Vector3<f64> {
    let lat = f64::from(point.lat).to_radians();
    let lon = f64::from(point.lon).to_radians();
    let height = f64::from(point.height);

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    let prime_vertical = wgs84::SEMI_MAJOR_AXIS
        / (1.0 - wgs84::ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();

    Vector3::new(
        (prime_vertical + height) * cos_lat * cos_lon,
        (prime_vertical + height) * cos_lat * sin_lon,
        (prime_vertical * (1.0 - wgs84::ECCENTRICITY_SQ) + height) * sin_lat,
    )
}

impl Projection for EcefProjection {
    #[inline]
    fn project(&self, point: &GeoPoint) -> [f32; 3] {
        let ecef = geodetic_to_ecef(point);
        [ecef.x as f32, ecef.y as f32, ecef.z as f32]
    }
}

impl Projection for GeodeticProjection {
    #[inline]
    fn project(&self, point: &GeoPoint) -> [f32; 3] {
        [point.lon, point.lat, point.height]
    }
}

/// Configurable choice of projection for the output buffers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    #[default]
    Ecef,
    Geodetic,
}

impl Projection for ProjectionKind {
    #[inline]
    fn project(&self, point: &GeoPoint) -> [f32; 3] {
        match self {
            ProjectionKind::Ecef => EcefProjection.project(point),
            ProjectionKind::Geodetic => GeodeticProjection.project(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_roi_contains_is_inclusive() {
        let roi = Roi::default();
        assert!(roi.contains_lat_lon(roi.min_lat, roi.min_lon));
        assert!(roi.contains_lat_lon(roi.max_lat, roi.max_lon));
        assert!(!roi.contains_lat_lon(roi.max_lat + 0.01, 80.0));
        assert!(!roi.contains_lat_lon(20.0, roi.min_lon - 0.01));
        assert!(!roi.contains_lat_lon(f32::NAN, 80.0));
    }

    #[test]
    fn test_roi_clamp_lands_on_edge() {
        let roi = Roi::default();
        assert_eq!(roi.clamp_lat_lon(60.0, 10.0), (roi.max_lat, roi.min_lon));
        assert_eq!(roi.clamp_lat_lon(20.0, 80.0), (20.0, 80.0));
    }

    #[test]
    fn test_roi_validate_rejects_inverted_bounds() {
        let roi = Roi {
            min_lat: 10.0,
            max_lat: 5.0,
            ..Roi::default()
        };
        assert!(matches!(roi.validate(), Err(WindError::InvalidConfig(_))));
        assert!(Roi::default().validate().is_ok());
    }

    #[test]
    fn test_ecef_equator_and_pole() {
        let equator = geodetic_to_ecef(&GeoPoint::new(0.0, 0.0, 0.0));
        assert_relative_eq!(equator.x, wgs84::SEMI_MAJOR_AXIS, epsilon = 1e-6);
        assert_relative_eq!(equator.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(equator.z, 0.0, epsilon = 1e-6);

        // Polar radius b = a * sqrt(1 - e²) ≈ 6356752.314 m
        let pole = geodetic_to_ecef(&GeoPoint::new(90.0, 0.0, 0.0));
        assert_relative_eq!(pole.z, 6_356_752.314, epsilon = 1e-2);

        // Height adds radially at the equator
        let raised = geodetic_to_ecef(&GeoPoint::new(0.0, 90.0, 1000.0));
        assert_relative_eq!(raised.y, wgs84::SEMI_MAJOR_AXIS + 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_edge_vertices_writes_twelve_segments() {
        let roi = Roi::default();
        let mut out = [0.0f32; Roi::EDGE_SCALARS];
        roi.edge_vertices(&GeodeticProjection, &mut out).unwrap();

        // First edge runs along the southern boundary at min height
        assert_eq!(&out[..6], &[66.0, 5.0, 0.0, 99.0, 5.0, 0.0]);
        // Last edge is the vertical edge at the north-west corner
        assert_eq!(&out[66..], &[66.0, 38.5, 0.0, 66.0, 38.5, 3_000_000.0]);

        let mut short = [0.0f32; 10];
        assert!(matches!(
            roi.edge_vertices(&GeodeticProjection, &mut short),
            Err(WindError::BufferLength { expected: 72, actual: 10 })
        ));
    }
}
