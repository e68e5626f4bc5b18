//! Wind Trails Core Library
//!
//! Animated wind particle trails over a bounded region of a 3D globe.
//! Sparse, multi-level gridded wind data is turned into a fixed pool of
//! particles that are advected every accepted tick and serialized into flat
//! line-segment buffers for a renderer.
//!
//! ## Pipeline
//!
//! - Field provider → [`WindFieldStore`] (generation-checked atomic replace)
//! - [`sample`] (nearest level by height, nearest grid cell)
//! - [`ParticleSystem`] (Euler step, respawn on NoData, bounded trails)
//! - [`TrailBufferBuilder`] (pre-sized vertex and colour buffers)
//!
//! [`WindEngine`] owns all of it and is what hosts drive.

pub mod config;
pub mod core_types;
pub mod error;
pub mod grid;
pub mod simulation;

// Re-export core types
pub use core_types::{
    ColorRamp, EcefProjection, GeoPoint, GeodeticProjection, LevelAltitudes, LevelId, Projection,
    ProjectionKind, Rgb, Roi, Vec3,
};

pub use config::{EngineConfig, ParticleConfig, SpawnConfig};
pub use error::{Result, WindError};

// Re-export field and sampling types
pub use grid::{
    sample, DirectoryProvider, FieldProvider, LoadPlan, LoadProgress, LoadTicket, NoDataReason,
    WindField, WindFieldStore, WindLevel, WindSample, WindVector,
};

// Re-export engine types
pub use simulation::{
    ParticleSystem, SeedOutcome, SystemState, TickOutcome, TrailBufferBuilder, UpdateScheduler,
    UpdateStats, ViewMode, WindEngine,
};
