//! Gridded wind data: levels, the multi-level field, its versioned store,
//! field providers and the sampler

pub mod provider;
pub mod sampler;
pub mod store;
pub mod wind_field;
pub mod wind_level;

pub use provider::{DirectoryProvider, FieldProvider};
pub use sampler::{sample, NoDataReason, WindSample, WindVector};
pub use store::{LoadPlan, LoadProgress, LoadTicket, WindFieldStore, MAX_PENDING_LOADS};
pub use wind_field::WindField;
pub use wind_level::{nearest_index, ComponentGrid, WindLevel, WindLevelPayload};
