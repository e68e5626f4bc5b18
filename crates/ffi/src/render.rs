//! Per-frame driving and buffer access for render hosts

use std::time::Duration;
use wind_trails_core::{Rgb, TickOutcome, ViewMode, WindEngine};

use crate::error::{DefaultWindTrailsError, WindTrailsErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_engine, with_engine_mut};
use crate::instance::WindTrailsInstance;

/// Scalars in the ROI wireframe buffer (12 edges, 2 endpoints, xyz)
pub const WIND_TRAILS_ROI_EDGE_LEN: usize = 72;

/// Linear RGB colour in `[0, 1]`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindTrailsColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<Rgb> for WindTrailsColor {
    fn from(rgb: Rgb) -> Self {
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    }
}

/// Copy `src` into the caller's buffer after checking its length.
///
/// # Safety
/// `out` must be null or valid for `len` writes of `f32`.
unsafe fn copy_out(
    src: &[f32],
    out: *mut f32,
    len: usize,
    param_name: &str,
) -> Result<(), DefaultWindTrailsError> {
    if out.is_null() {
        return Err(DefaultWindTrailsError::null_pointer(param_name));
    }
    if len < src.len() {
        return Err(DefaultWindTrailsError::buffer_too_small(param_name, src.len(), len));
    }
    // SAFETY: caller guarantees `out` is valid for `len >= src.len()` writes
    let dst = unsafe { std::slice::from_raw_parts_mut(out, src.len()) };
    dst.copy_from_slice(src);
    Ok(())
}

/// Frame callback. Steps the particles when the update interval has elapsed.
///
/// Parameters
/// - `now_ms`: monotonic host time in milliseconds (e.g. `performance.now()`).
///   Must be finite and non-negative.
/// - `out_stepped`: optional; set to whether this call advanced the particles.
///
/// While the layer is visible, a step also refreshes the vertex and colour buffers.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out_stepped` must be null or a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_tick(
    ptr: *const WindTrailsInstance,
    now_ms: f64,
    out_stepped: *mut bool,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let now = Duration::try_from_secs_f64(now_ms / 1000.0).map_err(|_| {
            DefaultWindTrailsError::invalid_parameter("now_ms", "must be finite and non-negative")
        })?;

        let outcome = with_engine_mut(instance, |engine| engine.tick(now))?;
        if !out_stepped.is_null() {
            unsafe {
                *out_stepped = matches!(outcome, TickOutcome::Stepped(_));
            }
        }
        Ok(())
    })
}

/// Turn particle updates on or off. Buffers keep their last contents while off.
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wind_trails_new`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_set_enabled(
    ptr: *const WindTrailsInstance,
    enabled: bool,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_engine_mut(instance, |engine| engine.set_enabled(enabled))
    })
}

/// Show or hide the layer. Hidden layers keep simulating but skip buffer writes.
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wind_trails_new`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_set_visible(
    ptr: *const WindTrailsInstance,
    visible: bool,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_engine_mut(instance, |engine| engine.set_visible(visible))
    })
}

/// Switch between the top-down camera (heights pinned to levels) and the
/// perspective camera (vertical motion shown where data has `w`).
///
/// # Safety
/// `ptr` must be a valid pointer returned by `wind_trails_new`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_set_top_view(
    ptr: *const WindTrailsInstance,
    top_view: bool,
) -> WindTrailsErrorCode {
    let view = if top_view {
        ViewMode::TopDown
    } else {
        ViewMode::Perspective
    };
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_engine_mut(instance, |engine| engine.set_view_mode(view))
    })
}

/// Query layer visibility.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out_visible` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_is_visible(
    ptr: *const WindTrailsInstance,
    out_visible: *mut bool,
) -> WindTrailsErrorCode {
    if out_visible.is_null() {
        return track_error(&DefaultWindTrailsError::null_pointer("out_visible"));
    }
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let visible = with_engine(instance, WindEngine::is_visible)?;
        unsafe {
            *out_visible = visible;
        }
        Ok(())
    })
}

/// Number of `f32` scalars in the vertex buffer (and in the colour buffer).
///
/// Fixed for the lifetime of the instance, so hosts can allocate once.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out_len` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_vertex_len(
    ptr: *const WindTrailsInstance,
    out_len: *mut usize,
) -> WindTrailsErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultWindTrailsError::null_pointer("out_len"));
    }
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let len = with_engine(instance, WindEngine::vertex_len)?;
        unsafe {
            *out_len = len;
        }
        Ok(())
    })
}

/// Copy trail segment endpoints into `out`.
///
/// Layout per particle, per segment oldest to newest: `[ax, ay, az, bx, by, bz]`.
/// Returns `BufferTooSmall` if `len` is below `wind_trails_vertex_len`.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out` must be valid for `len` writes of `f32`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_copy_vertices(
    ptr: *const WindTrailsInstance,
    out: *mut f32,
    len: usize,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_engine(instance, |engine| unsafe {
            copy_out(engine.vertices(), out, len, "out")
        })?
    })
}

/// Copy per-vertex RGB colours into `out`, parallel to the vertex buffer.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out` must be valid for `len` writes of `f32`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_copy_colors(
    ptr: *const WindTrailsInstance,
    out: *mut f32,
    len: usize,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_engine(instance, |engine| unsafe {
            copy_out(engine.colors(), out, len, "out")
        })?
    })
}

/// Single layer colour from the mean particle speed of the latest step.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out_color` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_frame_color(
    ptr: *const WindTrailsInstance,
    out_color: *mut WindTrailsColor,
) -> WindTrailsErrorCode {
    if out_color.is_null() {
        return track_error(&DefaultWindTrailsError::null_pointer("out_color"));
    }
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let color = with_engine(instance, WindEngine::frame_color)?;
        unsafe {
            *out_color = color.into();
        }
        Ok(())
    })
}

/// Write the ROI box wireframe (`WIND_TRAILS_ROI_EDGE_LEN` scalars) into `out`.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `wind_trails_new`.
/// - `out` must be valid for `len` writes of `f32`.
#[no_mangle]
pub unsafe extern "C" fn wind_trails_copy_roi_edges(
    ptr: *const WindTrailsInstance,
    out: *mut f32,
    len: usize,
) -> WindTrailsErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut edges = [0.0f32; WIND_TRAILS_ROI_EDGE_LEN];
        with_engine(instance, |engine| engine.roi_edges(&mut edges))??;
        unsafe { copy_out(&edges, out, len, "out") }
    })
}
