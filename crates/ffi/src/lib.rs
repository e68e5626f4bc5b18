//! C ABI for the wind trails engine
//!
//! Every function takes an opaque `WindTrailsInstance*` created by
//! `wind_trails_new` and returns a `WindTrailsErrorCode`. On failure the
//! message is available from `wind_trails_get_last_error` on the same thread.
//!
//! A typical host:
//! 1. creates an instance (optionally with a JSON config)
//! 2. opens a load with `wind_trails_begin_load` and submits each level's JSON
//!    as it arrives
//! 3. calls `wind_trails_tick` every frame and copies the vertex and colour
//!    buffers into its line geometry

mod error;
mod helpers;
mod instance;
mod loading;
mod render;

pub use error::{wind_trails_get_last_error, wind_trails_get_last_error_code, WindTrailsErrorCode};
pub use instance::{wind_trails_destroy, wind_trails_new, WindTrailsInstance};
pub use loading::{
    wind_trails_abandon_load, wind_trails_begin_load, wind_trails_submit_level,
    WindTrailsLoadStatus,
};
pub use render::{
    wind_trails_copy_colors, wind_trails_copy_roi_edges, wind_trails_copy_vertices,
    wind_trails_frame_color, wind_trails_is_visible, wind_trails_set_enabled,
    wind_trails_set_top_view, wind_trails_set_visible, wind_trails_tick, wind_trails_vertex_len,
    WindTrailsColor, WIND_TRAILS_ROI_EDGE_LEN,
};
