//! Wind field load coordination over the C ABI
//!
//! Hosts fetch level payloads themselves (network, cache, disk) and hand the
//! JSON text over as it arrives. Each load has a generation number; results
//! for a load that was superseded are dropped rather than installed.

use std::os::raw::c_char;
use wind_trails_core::{LevelId, LoadPlan, LoadProgress};

use crate::error::{DefaultWindTrailsError, WindTrailsErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, str_from_ptr, track_error, with_engine_mut};
use crate::instance::WindTrailsInstance;

/// Outcome of submitting one level payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindTrailsLoadStatus {
    /// More levels are needed before the load completes.
    Pending = 0,
    /// The load completed; particles were reseeded on the new field.
    Installed = 1,
    /// A newer field was installed first; this load's data was dropped.
    Discarded = 2,
}

impl From<LoadProgress> for WindTrailsLoadStatus {
    fn from(progress: LoadProgress) -> Self {
        match progress {
            LoadProgress::Pending { .. } => WindTrailsLoadStatus::Pending,
            LoadProgress::Installed { .. } => WindTrailsLoadStatus::Installed,
            LoadProgress::Discarded { .. } => WindTrailsLoadStatus::Discarded,
        }
    }
}

fn parse_level(name: &str) -> Result<LevelId, DefaultWindTrailsError> {
    name.parse::<LevelId>()
        .map_err(|e| DefaultWindTrailsError::invalid_parameter("level", &e.to_string()))
}

/// Start loading a new wind field.
///
/// Parameters
/// - `level`: `"surface"`, `"850"`, `"700"` or `"500"` to load that single level,
///   or null / `"all"` to load every level (3D mode).
/// - `time_step`: label of the time step being loaded (non-null).
/// - `out_generation`: receives the generation to pass to `wind_trails_submit_level`.
///
/// Returns `Ok`, `NullPointer`, `InvalidParameter` or `LockPoisoned`.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `level` must be null or a valid null-terminated string.
/// - `time_step` must be a valid null-terminated string.
/// - `out_generation` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_begin_load(
    ptr: *const WindTrailsInstance,
    level: *const c_char,
    time_step: *const c_char,
    out_generation: *mut u64,
) -> WindTrailsErrorCode {
    if out_generation.is_null() {
        return track_error(&DefaultWindTrailsError::null_pointer("out_generation"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let time_step = unsafe { str_from_ptr(time_step, "time_step") }?;
        let plan = if level.is_null() {
            LoadPlan::AllLevels
        } else {
            match unsafe { str_from_ptr(level, "level") }? {
                "all" => LoadPlan::AllLevels,
                name => LoadPlan::SingleLevel(parse_level(name)?),
            }
        };

        let ticket = with_engine_mut(instance, |engine| engine.begin_load(plan, time_step))?;
        unsafe {
            *out_generation = ticket.generation;
        }
        Ok(())
    })
}

/// Submit the JSON payload for one level of a pending load.
///
/// The payload has the shape `{"lat": [...], "lon": [...], "u": [[...]], "v": [[...]]}`
/// with an optional `"w"` grid. Rows and values may be null. Other members,
/// such as a `"height"`, are ignored; level altitudes come from the configured table.
///
/// A malformed payload fails with `InvalidPayload` and drops the whole load.
///
/// Parameters
/// - `generation`: value returned by `wind_trails_begin_load`.
/// - `level`: the level this payload belongs to.
/// - `payload_json`: null-terminated JSON text.
/// - `out_status`: optional; receives the load status on success.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `level` and `payload_json` must be valid null-terminated strings.
/// - `out_status` must be null or a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_submit_level(
    ptr: *const WindTrailsInstance,
    generation: u64,
    level: *const c_char,
    payload_json: *const c_char,
    out_status: *mut WindTrailsLoadStatus,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let level = parse_level(unsafe { str_from_ptr(level, "level") }?)?;
        let json = unsafe { str_from_ptr(payload_json, "payload_json") }?;

        let progress =
            with_engine_mut(instance, |engine| engine.submit_generation(generation, level, json))??;

        if !out_status.is_null() {
            unsafe {
                *out_status = progress.into();
            }
        }
        Ok(())
    })
}

/// Cancel a pending load, e.g. when the user switches time step mid-fetch.
///
/// Returns `Ok` even if the load had already completed or been dropped.
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wind_trails_new`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_abandon_load(
    ptr: *const WindTrailsInstance,
    generation: u64,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_engine_mut(instance, |engine| {
            engine.abandon_load(generation);
        })
    })
}
