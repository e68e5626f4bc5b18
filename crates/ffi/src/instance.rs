use std::os::raw::c_char;
use std::ptr;
use std::sync::RwLock;
use wind_trails_core::{EngineConfig, WindEngine};

use crate::error::{DefaultWindTrailsError, WindTrailsErrorCode};
use crate::helpers::{str_from_ptr, track_error, track_result};

/// The wind trails context handed to render hosts.
///
/// # Thread Safety
/// The engine is protected by an `RwLock`:
/// - **Multiple concurrent readers**: buffer copies, visibility and colour queries
/// - **Exclusive writer**: ticks, loads, and toggles
///
/// A host typically ticks and copies buffers from its render thread while
/// submitting level payloads from network callbacks on other threads.
///
/// ## Example (C)
/// ```c
/// WindTrailsInstance* trails = NULL;
/// if (wind_trails_new(NULL, &trails) != Ok) { return; }
///
/// uint64_t gen = 0;
/// wind_trails_begin_load(trails, "850", "2024-06-01T00", &gen);
/// wind_trails_submit_level(trails, gen, "850", json, NULL);
///
/// // every frame
/// wind_trails_tick(trails, now_ms, NULL);
/// wind_trails_copy_vertices(trails, vertex_buffer, vertex_buffer_len);
///
/// wind_trails_destroy(trails);
/// ```
pub struct WindTrailsInstance {
    pub(crate) engine: RwLock<WindEngine>,
}

impl WindTrailsInstance {
    /// Creates a new instance from an optional JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `WindTrailsErrorCode::InvalidConfig` if the JSON does not parse or validate.
    pub(crate) fn new(config_json: Option<&str>) -> Result<Box<Self>, DefaultWindTrailsError> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json_str(json)
                .map_err(|e| DefaultWindTrailsError::invalid_config(&e.to_string()))?,
            None => EngineConfig::default(),
        };
        let engine = WindEngine::new(config)?;

        Ok(Box::new(Self {
            engine: RwLock::new(engine),
        }))
    }
}

/// Create a new wind trails instance and return it via out-parameter.
///
/// Parameters
/// - `config_json`: null-terminated JSON configuration, or null for defaults.
///   Missing keys take their default values.
/// - `out_instance`: pointer to receive the created instance. Must be non-null.
///   Set to null on failure.
///
/// Returns
/// - `WindTrailsErrorCode::Ok` (0): success, `out_instance` contains valid pointer
/// - `WindTrailsErrorCode::NullPointer`: `out_instance` is null
/// - `WindTrailsErrorCode::InvalidConfig`: configuration did not parse or validate
/// - `WindTrailsErrorCode::InvalidParameter`: `config_json` is not UTF-8
///
/// # Safety
///
/// - `config_json` must be null or a valid null-terminated string.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call
///   `wind_trails_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_new(
    config_json: *const c_char,
    out_instance: *mut *mut WindTrailsInstance,
) -> WindTrailsErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWindTrailsError::null_pointer("out_instance"));
    }

    let json = if config_json.is_null() {
        Ok(None)
    } else {
        // SAFETY: non-null, null-terminated per contract
        unsafe { str_from_ptr(config_json, "config_json") }.map(Some)
    };
    let created = json.and_then(WindTrailsInstance::new);

    match track_result(created) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            WindTrailsErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroys an instance previously created by `wind_trails_new`.
///
/// If `ptr` is null, this function is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `wind_trails_new`.
/// - The pointer MUST NOT have been freed already.
/// - After calling this function, the caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_destroy(ptr: *mut WindTrailsInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: The pointer was created by `Box::into_raw` in `wind_trails_new`
    // and has not been freed. Reclaiming the Box drops the engine.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
