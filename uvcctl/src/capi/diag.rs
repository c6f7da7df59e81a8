//! C surface: error classification, last-error slot, statistics, and
//! diagnostic reports.

use std::ffi::{c_char, c_int};

use uvcctl_core::error::ErrorCode;

use crate::diagnostics;

use super::{copy_to_buffer, set_last_error, take_last_error, to_error_code, uvcctl_result_t};

/// Static description for a result code.
#[no_mangle]
pub extern "C" fn uvcctl_get_error_string(result: uvcctl_result_t) -> *const c_char {
    match to_error_code(result) {
        ErrorCode::Success => c"Success".as_ptr(),
        ErrorCode::DeviceNotFound => c"Device not found or disconnected".as_ptr(),
        ErrorCode::DeviceBusy => c"Device is busy or in use".as_ptr(),
        ErrorCode::PropertyNotSupported => c"Property not supported by device".as_ptr(),
        ErrorCode::InvalidValue => c"Property value out of range".as_ptr(),
        ErrorCode::PermissionDenied => c"Insufficient permissions".as_ptr(),
        ErrorCode::SystemError => c"System or platform error".as_ptr(),
        ErrorCode::InvalidArgument => c"Invalid function argument".as_ptr(),
        ErrorCode::NotImplemented => c"Feature not implemented on this platform".as_ptr(),
        ErrorCode::ConnectionFailed => c"Failed to establish device connection".as_ptr(),
        ErrorCode::Timeout => c"Operation timed out".as_ptr(),
        ErrorCode::BufferTooSmall => c"Provided buffer is too small".as_ptr(),
    }
}

/// Details of the last failure observed on this thread.
#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_last_error_details(
    buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    let details = take_last_error();
    copy_to_buffer(&details, buffer, buffer_size, required_size)
}

#[no_mangle]
pub extern "C" fn uvcctl_clear_last_error() {
    set_last_error("");
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_error_statistics(
    buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    copy_to_buffer(
        &diagnostics::error_statistics(),
        buffer,
        buffer_size,
        required_size,
    )
}

#[no_mangle]
pub extern "C" fn uvcctl_reset_error_statistics() {
    diagnostics::reset_error_statistics();
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_diagnostic_info(
    buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    copy_to_buffer(
        &diagnostics::diagnostic_info(),
        buffer,
        buffer_size,
        required_size,
    )
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_suggest_error_resolution(
    result: uvcctl_result_t,
    buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    copy_to_buffer(
        &diagnostics::suggest_error_resolution(to_error_code(result)),
        buffer,
        buffer_size,
        required_size,
    )
}

#[no_mangle]
pub extern "C" fn uvcctl_is_device_error(result: uvcctl_result_t) -> c_int {
    to_error_code(result).is_device_error() as c_int
}

#[no_mangle]
pub extern "C" fn uvcctl_is_permission_error(result: uvcctl_result_t) -> c_int {
    to_error_code(result).is_permission_error() as c_int
}

#[no_mangle]
pub extern "C" fn uvcctl_is_temporary_error(result: uvcctl_result_t) -> c_int {
    to_error_code(result).is_temporary() as c_int
}

#[no_mangle]
pub extern "C" fn uvcctl_is_user_error(result: uvcctl_result_t) -> c_int {
    to_error_code(result).is_user_error() as c_int
}

#[no_mangle]
pub extern "C" fn uvcctl_should_retry_operation(result: uvcctl_result_t) -> c_int {
    to_error_code(result).should_retry() as c_int
}
