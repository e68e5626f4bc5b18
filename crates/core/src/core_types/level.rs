//! Discrete altitude levels of the wind field
//!
//! Wind data arrives per pressure level. The set of levels is closed and small,
//! so it is modelled as an enum whose declaration order is the deterministic
//! iteration order used everywhere (field storage, level selection ties, seeding).

use crate::error::WindError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a wind level.
///
/// Ordering follows declaration order: `Surface < Hpa850 < Hpa700 < Hpa500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelId {
    /// Near-surface wind (10 m)
    #[serde(rename = "surface")]
    Surface,
    /// 850 hPa (~1.5 km)
    #[serde(rename = "850")]
    Hpa850,
    /// 700 hPa (~3 km)
    #[serde(rename = "700")]
    Hpa700,
    /// 500 hPa (~5.5 km)
    #[serde(rename = "500")]
    Hpa500,
}

impl LevelId {
    /// Every level, in iteration order
    pub const ALL: [LevelId; 4] = [
        LevelId::Surface,
        LevelId::Hpa850,
        LevelId::Hpa700,
        LevelId::Hpa500,
    ];

    /// Name used by field providers (`"surface"`, `"850"`, ...)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LevelId::Surface => "surface",
            LevelId::Hpa850 => "850",
            LevelId::Hpa700 => "700",
            LevelId::Hpa500 => "500",
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelId {
    type Err = WindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "surface" | "Surface" | "SURFACE" => Ok(LevelId::Surface),
            "850" => Ok(LevelId::Hpa850),
            "700" => Ok(LevelId::Hpa700),
            "500" => Ok(LevelId::Hpa500),
            other => Err(WindError::UnknownLevel(other.to_string())),
        }
    }
}

/// Base altitude that lifts all display levels off the globe surface (m)
pub const DISPLAY_BASE_M: f32 = 200_000.0;

/// Fixed display altitude per level (m).
///
/// Altitudes are exaggerated far beyond the physical pressure heights so the
/// levels stay visually separated on a globe. Particle heights come from this
/// table, independent of any altitude carried by the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelAltitudes {
    pub surface: f32,
    #[serde(rename = "850")]
    pub hpa850: f32,
    #[serde(rename = "700")]
    pub hpa700: f32,
    #[serde(rename = "500")]
    pub hpa500: f32,
}

impl LevelAltitudes {
    /// Standard offsets (300/900/1500/2200 km) above the given base
    #[must_use]
    pub fn with_base(base: f32) -> Self {
        Self {
            surface: base + 300_000.0,
            hpa850: base + 900_000.0,
            hpa700: base + 1_500_000.0,
            hpa500: base + 2_200_000.0,
        }
    }

    /// Display altitude for a level
    #[must_use]
    pub fn altitude(&self, level: LevelId) -> f32 {
        match level {
            LevelId::Surface => self.surface,
            LevelId::Hpa850 => self.hpa850,
            LevelId::Hpa700 => self.hpa700,
            LevelId::Hpa500 => self.hpa500,
        }
    }

    /// Iterate `(level, altitude)` pairs in level order
    pub fn iter(&self) -> impl Iterator<Item = (LevelId, f32)> + '_ {
        LevelId::ALL.into_iter().map(|level| (level, self.altitude(level)))
    }
}

impl Default for LevelAltitudes {
    fn default() -> Self {
        Self::with_base(DISPLAY_BASE_M)
    }
}
