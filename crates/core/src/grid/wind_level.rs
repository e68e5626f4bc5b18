//! One altitude level of gridded wind data
//!
//! A level is two ordered coordinate axes plus 2D component grids indexed
//! `[lat_index][lon_index]`. Grids may be sparse: a row can be missing or
//! shorter than the longitude axis, and any single value can be null.

use crate::core_types::LevelId;
use crate::error::{Result, WindError};
use crate::grid::sampler::WindVector;
use serde::{Deserialize, Serialize};

/// Raw payload as delivered by a field provider.
///
/// ```json
/// { "lat": [5.0, 5.25], "lon": [66.0, 66.25],
///   "u": [[1.0, null], [2.0, 3.0]], "v": [[0.5, 0.5], null],
///   "w": [[0.0, 0.0]] }
/// ```
///
/// Unknown members, `height` included, are ignored. A level's altitude always
/// comes from the display altitude table that particle heights use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindLevelPayload {
    pub lat: Vec<f32>,
    pub lon: Vec<f32>,
    pub u: Vec<Option<Vec<Option<f32>>>>,
    pub v: Vec<Option<Vec<Option<f32>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<Vec<Option<Vec<Option<f32>>>>>,
}

/// Sparse 2D grid of one wind component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentGrid {
    rows: Vec<Vec<Option<f32>>>,
}

impl ComponentGrid {
    /// Build from possibly-missing rows; a missing row reads as all NoData
    #[must_use]
    pub fn from_sparse(rows: Vec<Option<Vec<Option<f32>>>>) -> Self {
        Self {
            rows: rows.into_iter().map(Option::unwrap_or_default).collect(),
        }
    }

    /// Build from dense rows
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        }
    }

    /// `rows × cols` grid holding `value` everywhere
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows: vec![vec![Some(value); cols]; rows],
        }
    }

    /// Value at `[i][j]`; `None` if absent or non-finite
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.rows
            .get(i)?
            .get(j)
            .copied()
            .flatten()
            .filter(|value| value.is_finite())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Validated wind data for one level
#[derive(Debug, Clone, PartialEq)]
pub struct WindLevel {
    id: LevelId,
    latitude_axis: Vec<f32>,
    longitude_axis: Vec<f32>,
    eastward: ComponentGrid,
    northward: ComponentGrid,
    vertical: Option<ComponentGrid>,
    altitude_m: f32,
}

impl WindLevel {
    /// Create a level from validated axes and component grids.
    ///
    /// Axes must be non-empty, finite and strictly monotonic (either direction).
    pub fn new(
        id: LevelId,
        latitude_axis: Vec<f32>,
        longitude_axis: Vec<f32>,
        eastward: ComponentGrid,
        northward: ComponentGrid,
        altitude_m: f32,
    ) -> Result<Self> {
        validate_axis(id, "lat", &latitude_axis)?;
        validate_axis(id, "lon", &longitude_axis)?;
        if !altitude_m.is_finite() {
            return Err(WindError::Schema {
                level: id,
                message: format!("height must be finite, got {altitude_m}"),
            });
        }

        Ok(Self {
            id,
            latitude_axis,
            longitude_axis,
            eastward,
            northward,
            vertical: None,
            altitude_m,
        })
    }

    /// Attach the optional vertical component grid
    #[must_use]
    pub fn with_vertical(mut self, vertical: ComponentGrid) -> Self {
        self.vertical = Some(vertical);
        self
    }

    /// Validate a decoded payload placed at display altitude `altitude_m`
    pub fn from_payload(id: LevelId, payload: WindLevelPayload, altitude_m: f32) -> Result<Self> {
        let level = Self::new(
            id,
            payload.lat,
            payload.lon,
            ComponentGrid::from_sparse(payload.u),
            ComponentGrid::from_sparse(payload.v),
            altitude_m,
        )?;

        Ok(match payload.w {
            Some(w) => level.with_vertical(ComponentGrid::from_sparse(w)),
            None => level,
        })
    }

    /// Decode and validate a JSON payload. Any decoding failure is reported
    /// as [`WindError::Schema`] for this level.
    pub fn from_json(id: LevelId, json: &str, altitude_m: f32) -> Result<Self> {
        let payload: WindLevelPayload =
            serde_json::from_str(json).map_err(|e| WindError::Schema {
                level: id,
                message: e.to_string(),
            })?;
        Self::from_payload(id, payload, altitude_m)
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    /// Altitude used for nearest-level selection (m)
    pub fn altitude_m(&self) -> f32 {
        self.altitude_m
    }

    pub fn latitude_axis(&self) -> &[f32] {
        &self.latitude_axis
    }

    pub fn longitude_axis(&self) -> &[f32] {
        &self.longitude_axis
    }

    pub fn has_vertical(&self) -> bool {
        self.vertical.is_some()
    }

    /// Nearest-neighbour wind at `(lat, lon)`.
    ///
    /// `None` when either horizontal component is absent at the resolved cell.
    /// `w` is only present when the level has a vertical grid with a value there.
    #[inline]
    pub fn wind_at(&self, lat: f32, lon: f32) -> Option<WindVector> {
        let i = nearest_index(&self.latitude_axis, lat);
        let j = nearest_index(&self.longitude_axis, lon);

        let u = self.eastward.get(i, j)?;
        let v = self.northward.get(i, j)?;
        let w = self.vertical.as_ref().and_then(|grid| grid.get(i, j));

        Some(WindVector { u, v, w })
    }
}

/// Index of the axis entry nearest to `value`, assuming even spacing.
///
/// Computed from the axis end points, so ascending and descending axes both
/// work. Values beyond either end clamp to that end.
#[inline]
#[must_use]
pub fn nearest_index(axis: &[f32], value: f32) -> usize {
    let last = axis.len().saturating_sub(1);
    if last == 0 {
        return 0;
    }

    let span = axis[last] - axis[0];
    if span == 0.0 {
        return 0;
    }

    let t = (value - axis[0]) / span;
    let index = (t * last as f32).round();
    if index.is_nan() {
        return 0;
    }
    index.clamp(0.0, last as f32) as usize
}

fn validate_axis(level: LevelId, name: &str, axis: &[f32]) -> Result<()> {
    let schema = |message: String| WindError::Schema { level, message };

    if axis.is_empty() {
        return Err(schema(format!("{name} axis is empty")));
    }
    if let Some(bad) = axis.iter().find(|value| !value.is_finite()) {
        return Err(schema(format!("{name} axis contains non-finite value {bad}")));
    }
    if axis.len() > 1 {
        let ascending = axis[1] > axis[0];
        let monotonic = axis.windows(2).all(|pair| {
            if ascending {
                pair[1] > pair[0]
            } else {
                pair[1] < pair[0]
            }
        });
        if !monotonic {
            return Err(schema(format!("{name} axis is not strictly monotonic")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(start: f32, step: f32, n: usize) -> Vec<f32> {
        (0..n).map(|i| start + step * i as f32).collect()
    }

    #[test]
    fn test_nearest_index_ascending_and_descending() {
        let ascending = axis(5.0, 1.0, 11); // 5..=15
        assert_eq!(nearest_index(&ascending, 5.0), 0);
        assert_eq!(nearest_index(&ascending, 7.4), 2);
        assert_eq!(nearest_index(&ascending, 7.6), 3);
        assert_eq!(nearest_index(&ascending, 15.0), 10);
        assert_eq!(nearest_index(&ascending, 99.0), 10);
        assert_eq!(nearest_index(&ascending, -99.0), 0);

        let descending = axis(15.0, -1.0, 11); // 15..=5
        assert_eq!(nearest_index(&descending, 15.0), 0);
        assert_eq!(nearest_index(&descending, 7.0), 8);
        assert_eq!(nearest_index(&descending, 5.0), 10);

        assert_eq!(nearest_index(&[42.0], 0.0), 0);
        assert_eq!(nearest_index(&ascending, f32::NAN), 0);
    }

    #[test]
    fn test_sparse_rows_read_as_missing() {
        let grid = ComponentGrid::from_sparse(vec![
            Some(vec![Some(1.0), None]),
            None,
            Some(vec![Some(3.0)]),
        ]);
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(0, 1), None);
        assert_eq!(grid.get(1, 0), None);
        assert_eq!(grid.get(2, 1), None);
        assert_eq!(grid.get(7, 0), None);
    }

    #[test]
    fn test_from_json_reports_schema_errors() {
        let missing_v = r#"{"lat": [1.0], "lon": [1.0], "u": [[1.0]]}"#;
        assert!(matches!(
            WindLevel::from_json(LevelId::Hpa700, missing_v, 0.0),
            Err(WindError::Schema { level: LevelId::Hpa700, .. })
        ));

        let non_array = r#"{"lat": 3, "lon": [1.0], "u": [[1.0]], "v": [[1.0]]}"#;
        assert!(matches!(
            WindLevel::from_json(LevelId::Surface, non_array, 0.0),
            Err(WindError::Schema { .. })
        ));

        let unsorted = r#"{"lat": [1.0, 3.0, 2.0], "lon": [1.0], "u": [], "v": []}"#;
        let err = WindLevel::from_json(LevelId::Surface, unsorted, 0.0).unwrap_err();
        assert!(err.to_string().contains("monotonic"), "unexpected error: {err}");

        let empty = r#"{"lat": [], "lon": [1.0], "u": [], "v": []}"#;
        assert!(WindLevel::from_json(LevelId::Surface, empty, 0.0).is_err());
    }

    #[test]
    fn test_payload_height_is_ignored() {
        let json = r#"{"lat": [0.0, 1.0], "lon": [0.0, 1.0],
                       "u": [[1.0, 1.0], [1.0, 1.0]], "v": [[2.0, 2.0], [2.0, 2.0]],
                       "height": 1234.0}"#;
        let level = WindLevel::from_json(LevelId::Hpa850, json, 99.0).unwrap();
        assert_eq!(level.altitude_m(), 99.0);
        assert!(!level.has_vertical());

        let json = r#"{"lat": [0.0], "lon": [0.0], "u": [[1.0]], "v": [[2.0]], "w": [[0.5]]}"#;
        let level = WindLevel::from_json(LevelId::Hpa850, json, 99.0).unwrap();
        assert_eq!(level.altitude_m(), 99.0);
        assert_eq!(
            level.wind_at(0.0, 0.0),
            Some(WindVector { u: 1.0, v: 2.0, w: Some(0.5) })
        );
    }

    #[test]
    fn test_wind_at_missing_component_is_none() {
        let json = r#"{"lat": [0.0, 1.0], "lon": [0.0, 1.0],
                       "u": [[1.0, null], [1.0, 1.0]], "v": [[2.0, 2.0], null]}"#;
        let level = WindLevel::from_json(LevelId::Surface, json, 0.0).unwrap();
        assert!(level.wind_at(0.0, 0.0).is_some());
        assert!(level.wind_at(0.0, 1.0).is_none());
        assert!(level.wind_at(1.0, 1.0).is_none());
    }
}
