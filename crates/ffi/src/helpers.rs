use crate::error::{with_last_error_mut, DefaultWindTrailsError, WindTrailsError, WindTrailsErrorCode};
use crate::instance::WindTrailsInstance;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use wind_trails_core::WindEngine;

/// Set the thread-local error message and code.
/// Accepts any type implementing `WindTrailsError` trait.
pub(crate) fn set_last_error(error: &impl WindTrailsError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl WindTrailsError) -> WindTrailsErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = WindTrailsErrorCode::Ok;
    });
}

/// Record the error of a failed result and hand back its code.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultWindTrailsError>,
) -> Result<T, WindTrailsErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Run an FFI body and collapse its result into an error code.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> WindTrailsErrorCode
where
    F: FnOnce() -> Result<(), DefaultWindTrailsError>,
{
    match track_result(f()) {
        Ok(()) => WindTrailsErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow the instance behind `ptr`.
///
/// # Safety
/// `ptr` must be null or a pointer returned by `wind_trails_new` that has not been destroyed.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const WindTrailsInstance,
) -> Result<&'a WindTrailsInstance, DefaultWindTrailsError> {
    // SAFETY: caller guarantees `ptr` is null or a live instance
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultWindTrailsError::null_pointer("ptr"))
}

/// Borrow a required C string argument as UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a null-terminated string valid for the call.
pub(crate) unsafe fn str_from_ptr<'a>(
    ptr: *const c_char,
    param_name: &str,
) -> Result<&'a str, DefaultWindTrailsError> {
    if ptr.is_null() {
        return Err(DefaultWindTrailsError::null_pointer(param_name));
    }
    // SAFETY: non-null and null-terminated per caller contract
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| DefaultWindTrailsError::invalid_parameter(param_name, "not valid UTF-8"))
}

/// Run `f` with a shared lock on the engine.
pub(crate) fn with_engine<F, T>(
    instance: &WindTrailsInstance,
    f: F,
) -> Result<T, DefaultWindTrailsError>
where
    F: FnOnce(&WindEngine) -> T,
{
    let engine = instance
        .engine
        .read()
        .map_err(|_| DefaultWindTrailsError::lock_poisoned("engine"))?;
    Ok(f(&engine))
}

/// Run `f` with an exclusive lock on the engine.
pub(crate) fn with_engine_mut<F, T>(
    instance: &WindTrailsInstance,
    f: F,
) -> Result<T, DefaultWindTrailsError>
where
    F: FnOnce(&mut WindEngine) -> T,
{
    let mut engine = instance
        .engine
        .write()
        .map_err(|_| DefaultWindTrailsError::lock_poisoned("engine"))?;
    Ok(f(&mut engine))
}
