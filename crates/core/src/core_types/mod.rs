//! Core types shared by the sampler, the particle system and the render buffers

pub mod color;
pub mod geo;
pub mod level;
pub mod vec3;

pub use color::{hsl_to_rgb, ColorRamp, Rgb};
pub use geo::{
    geodetic_to_ecef, EcefProjection, GeoPoint, GeodeticProjection, Projection, ProjectionKind,
    Roi,
};
pub use level::{LevelAltitudes, LevelId, DISPLAY_BASE_M};
pub use vec3::Vec3;
