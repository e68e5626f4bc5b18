use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use wind_trails_core::WindError;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait WindTrailsError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> WindTrailsErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `WindTrailsError` for FFI error scenarios.
///
/// Wraps a `WindTrailsErrorCode` with a message; one constructor per failure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultWindTrailsError {
    code: WindTrailsErrorCode,
    msg: String,
}

impl DefaultWindTrailsError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: WindTrailsErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"engine"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: WindTrailsErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for an invalid parameter.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid parameter
    /// * `message` - What is wrong with it
    pub fn invalid_parameter(param_name: &str, message: &str) -> Self {
        Self {
            code: WindTrailsErrorCode::InvalidParameter,
            msg: format!("Parameter '{param_name}': {message}"),
        }
    }

    /// Create error for a configuration document that failed to parse or validate.
    pub fn invalid_config(message: &str) -> Self {
        Self {
            code: WindTrailsErrorCode::InvalidConfig,
            msg: format!("Invalid configuration: {message}"),
        }
    }

    /// Create error for a caller buffer that cannot hold the output.
    ///
    /// # Arguments
    /// * `param_name` - The name of the buffer parameter
    /// * `required` - Scalars needed
    /// * `provided` - Scalars the caller offered
    pub fn buffer_too_small(param_name: &str, required: usize, provided: usize) -> Self {
        Self {
            code: WindTrailsErrorCode::BufferTooSmall,
            msg: format!("Buffer '{param_name}' holds {provided} scalars, {required} required"),
        }
    }
}

impl From<WindError> for DefaultWindTrailsError {
    fn from(error: WindError) -> Self {
        let code = match &error {
            WindError::InvalidConfig(_) => WindTrailsErrorCode::InvalidConfig,
            WindError::Schema { .. } | WindError::Json(_) | WindError::Provider { .. } | WindError::Io(_) => {
                WindTrailsErrorCode::InvalidPayload
            }
            WindError::BufferLength { .. } => WindTrailsErrorCode::BufferTooSmall,
            WindError::UnknownLevel(_)
            | WindError::UnexpectedLevel { .. }
            | WindError::UnknownGeneration(_) => WindTrailsErrorCode::InvalidParameter,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl WindTrailsError for DefaultWindTrailsError {
    fn code(&self) -> WindTrailsErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by wind trails functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindTrailsErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Configuration JSON could not be parsed or failed validation.
    InvalidConfig = 3,

    /// Invalid parameter passed to function (bad level name, unknown generation, non-finite time).
    InvalidParameter = 4,

    /// A wind level payload was malformed. The load it belonged to was dropped.
    InvalidPayload = 5,

    /// Output buffer shorter than the data to copy.
    BufferTooSmall = 6,
}

impl From<DefaultWindTrailsError> for WindTrailsErrorCode {
    fn from(error: DefaultWindTrailsError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored to prevent memory leaks when returning raw pointers via FFI.
    static LAST_ERROR: RefCell<(Option<CString>, WindTrailsErrorCode)> = const { RefCell::new((None, WindTrailsErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, WindTrailsErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, WindTrailsErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if no error has occurred or the error message cannot be converted to C string.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread has its own independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that sets
/// or clears the error. **DO NOT FREE THIS POINTER**.
///
/// Example:
/// ```c
/// WindTrailsInstance* trails = NULL;
/// if (wind_trails_new(config_json, &trails) != Ok) {
///     const char* error = wind_trails_get_last_error();
///     if (error) {
///         printf("Wind trails creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn wind_trails_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `WindTrailsErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn wind_trails_get_last_error_code() -> WindTrailsErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
