//! Stable C ABI.
//!
//! Everything here is `extern "C"` with no unwinding across the
//! boundary. Strings are UTF-8 both ways and every string getter uses
//! the buffer-sizing idiom: the caller passes
//! `(buf, buf_size, out required_size)` and receives `BufferTooSmall`
//! plus the required size when the buffer is short (a null buffer is a
//! pure size query). Opaque handles are owned by per-surface
//! registries; callers never see the underlying types.

#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

mod diag;
#[cfg(test)]
mod tests;

pub use diag::*;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::guid::Guid;
use uvcctl_core::logging::{self, LogLevel};
use uvcctl_core::props::{CamProp, VidProp};
use uvcctl_core::types::{CamMode, Device, PropRange, PropSetting};

use crate::camera::Camera;
use crate::capability::device_capabilities;
use crate::diagnostics;
use crate::monitor;
use crate::platform::{is_device_connected, list_devices};
use crate::pool::global_pool;
use crate::vendor;
use crate::vendor::logitech::{self, LogitechProperty};

/* ========================================================================
 * ABI types
 * ======================================================================== */

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum uvcctl_result_t {
    UVCCTL_SUCCESS = 0,
    UVCCTL_ERROR_DEVICE_NOT_FOUND,
    UVCCTL_ERROR_DEVICE_BUSY,
    UVCCTL_ERROR_PROPERTY_NOT_SUPPORTED,
    UVCCTL_ERROR_INVALID_VALUE,
    UVCCTL_ERROR_PERMISSION_DENIED,
    UVCCTL_ERROR_SYSTEM_ERROR,
    UVCCTL_ERROR_INVALID_ARGUMENT,
    UVCCTL_ERROR_NOT_IMPLEMENTED,
    UVCCTL_ERROR_CONNECTION_FAILED,
    UVCCTL_ERROR_TIMEOUT,
    UVCCTL_ERROR_BUFFER_TOO_SMALL,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum uvcctl_cam_mode_t {
    UVCCTL_CAM_MODE_AUTO = 0,
    UVCCTL_CAM_MODE_MANUAL = 1,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum uvcctl_log_level_t {
    UVCCTL_LOG_DEBUG = 0,
    UVCCTL_LOG_INFO = 1,
    UVCCTL_LOG_WARNING = 2,
    UVCCTL_LOG_ERROR = 3,
    UVCCTL_LOG_CRITICAL = 4,
}

/// Camera properties; values follow declaration order of the Rust enum
/// and are ABI-stable.
pub type uvcctl_cam_prop_t = u32;
/// Video-processing properties; same encoding rules.
pub type uvcctl_vid_prop_t = u32;
/// Logitech vendor property ids (1-based, see the vendor module).
pub type uvcctl_logitech_prop_t = u32;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct uvcctl_prop_setting_t {
    pub value: i32,
    pub mode: uvcctl_cam_mode_t,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct uvcctl_prop_range_t {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub default_val: i32,
    pub default_mode: uvcctl_cam_mode_t,
}

/// Opaque device handle.
#[repr(C)]
pub struct uvcctl_device_t {
    _private: [u8; 0],
}

/// Opaque connection handle.
#[repr(C)]
pub struct uvcctl_connection_t {
    _private: [u8; 0],
}

pub type uvcctl_log_callback_t =
    Option<unsafe extern "C" fn(level: uvcctl_log_level_t, message: *const c_char, user_data: *mut c_void)>;

pub type uvcctl_device_change_callback_t =
    Option<unsafe extern "C" fn(added: c_int, device_path: *const c_char, user_data: *mut c_void)>;

/* ========================================================================
 * Conversions and shared state
 * ======================================================================== */

fn to_result_t(code: ErrorCode) -> uvcctl_result_t {
    match code {
        ErrorCode::Success => uvcctl_result_t::UVCCTL_SUCCESS,
        ErrorCode::DeviceNotFound => uvcctl_result_t::UVCCTL_ERROR_DEVICE_NOT_FOUND,
        ErrorCode::DeviceBusy => uvcctl_result_t::UVCCTL_ERROR_DEVICE_BUSY,
        ErrorCode::PropertyNotSupported => uvcctl_result_t::UVCCTL_ERROR_PROPERTY_NOT_SUPPORTED,
        ErrorCode::InvalidValue => uvcctl_result_t::UVCCTL_ERROR_INVALID_VALUE,
        ErrorCode::PermissionDenied => uvcctl_result_t::UVCCTL_ERROR_PERMISSION_DENIED,
        ErrorCode::SystemError => uvcctl_result_t::UVCCTL_ERROR_SYSTEM_ERROR,
        ErrorCode::InvalidArgument => uvcctl_result_t::UVCCTL_ERROR_INVALID_ARGUMENT,
        ErrorCode::NotImplemented => uvcctl_result_t::UVCCTL_ERROR_NOT_IMPLEMENTED,
        ErrorCode::ConnectionFailed => uvcctl_result_t::UVCCTL_ERROR_CONNECTION_FAILED,
        ErrorCode::Timeout => uvcctl_result_t::UVCCTL_ERROR_TIMEOUT,
        ErrorCode::BufferTooSmall => uvcctl_result_t::UVCCTL_ERROR_BUFFER_TOO_SMALL,
    }
}

pub(crate) fn to_error_code(result: uvcctl_result_t) -> ErrorCode {
    match result {
        uvcctl_result_t::UVCCTL_SUCCESS => ErrorCode::Success,
        uvcctl_result_t::UVCCTL_ERROR_DEVICE_NOT_FOUND => ErrorCode::DeviceNotFound,
        uvcctl_result_t::UVCCTL_ERROR_DEVICE_BUSY => ErrorCode::DeviceBusy,
        uvcctl_result_t::UVCCTL_ERROR_PROPERTY_NOT_SUPPORTED => ErrorCode::PropertyNotSupported,
        uvcctl_result_t::UVCCTL_ERROR_INVALID_VALUE => ErrorCode::InvalidValue,
        uvcctl_result_t::UVCCTL_ERROR_PERMISSION_DENIED => ErrorCode::PermissionDenied,
        uvcctl_result_t::UVCCTL_ERROR_SYSTEM_ERROR => ErrorCode::SystemError,
        uvcctl_result_t::UVCCTL_ERROR_INVALID_ARGUMENT => ErrorCode::InvalidArgument,
        uvcctl_result_t::UVCCTL_ERROR_NOT_IMPLEMENTED => ErrorCode::NotImplemented,
        uvcctl_result_t::UVCCTL_ERROR_CONNECTION_FAILED => ErrorCode::ConnectionFailed,
        uvcctl_result_t::UVCCTL_ERROR_TIMEOUT => ErrorCode::Timeout,
        uvcctl_result_t::UVCCTL_ERROR_BUFFER_TOO_SMALL => ErrorCode::BufferTooSmall,
    }
}

fn to_mode(mode: uvcctl_cam_mode_t) -> CamMode {
    match mode {
        uvcctl_cam_mode_t::UVCCTL_CAM_MODE_AUTO => CamMode::Auto,
        uvcctl_cam_mode_t::UVCCTL_CAM_MODE_MANUAL => CamMode::Manual,
    }
}

fn from_mode(mode: CamMode) -> uvcctl_cam_mode_t {
    match mode {
        CamMode::Auto => uvcctl_cam_mode_t::UVCCTL_CAM_MODE_AUTO,
        CamMode::Manual => uvcctl_cam_mode_t::UVCCTL_CAM_MODE_MANUAL,
    }
}

fn from_setting(setting: PropSetting) -> uvcctl_prop_setting_t {
    uvcctl_prop_setting_t {
        value: setting.value,
        mode: from_mode(setting.mode),
    }
}

fn to_setting(setting: &uvcctl_prop_setting_t) -> PropSetting {
    PropSetting::new(setting.value, to_mode(setting.mode))
}

fn from_range(range: PropRange) -> uvcctl_prop_range_t {
    uvcctl_prop_range_t {
        min: range.min,
        max: range.max,
        step: range.step,
        default_val: range.default_val,
        default_mode: from_mode(range.default_mode),
    }
}

fn to_range(range: &uvcctl_prop_range_t) -> PropRange {
    PropRange {
        min: range.min,
        max: range.max,
        step: range.step,
        default_val: range.default_val,
        default_mode: to_mode(range.default_mode),
    }
}

fn to_log_level(level: uvcctl_log_level_t) -> LogLevel {
    match level {
        uvcctl_log_level_t::UVCCTL_LOG_DEBUG => LogLevel::Debug,
        uvcctl_log_level_t::UVCCTL_LOG_INFO => LogLevel::Info,
        uvcctl_log_level_t::UVCCTL_LOG_WARNING => LogLevel::Warning,
        uvcctl_log_level_t::UVCCTL_LOG_ERROR => LogLevel::Error,
        uvcctl_log_level_t::UVCCTL_LOG_CRITICAL => LogLevel::Critical,
    }
}

fn from_log_level(level: LogLevel) -> uvcctl_log_level_t {
    match level {
        LogLevel::Debug => uvcctl_log_level_t::UVCCTL_LOG_DEBUG,
        LogLevel::Info => uvcctl_log_level_t::UVCCTL_LOG_INFO,
        LogLevel::Warning => uvcctl_log_level_t::UVCCTL_LOG_WARNING,
        LogLevel::Error => uvcctl_log_level_t::UVCCTL_LOG_ERROR,
        LogLevel::Critical => uvcctl_log_level_t::UVCCTL_LOG_CRITICAL,
    }
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Device records owned by the surface. Pointers handed to C stay
/// stable because the records are boxed; the vector only stores the
/// boxes.
struct DeviceStorage(Vec<Box<Device>>);
unsafe impl Send for DeviceStorage {}

fn device_storage() -> &'static Mutex<DeviceStorage> {
    static STORAGE: OnceLock<Mutex<DeviceStorage>> = OnceLock::new();
    STORAGE.get_or_init(|| Mutex::new(DeviceStorage(Vec::new())))
}

/// Live connection handles, keyed by their raw address.
struct ConnectionRegistry(HashMap<usize, Box<Camera>>);
unsafe impl Send for ConnectionRegistry {}

fn connections() -> &'static Mutex<ConnectionRegistry> {
    static CONNECTIONS: OnceLock<Mutex<ConnectionRegistry>> = OnceLock::new();
    CONNECTIONS.get_or_init(|| Mutex::new(ConnectionRegistry(HashMap::new())))
}

pub(crate) fn set_last_error(details: &str) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = details.to_string();
    });
}

pub(crate) fn take_last_error() -> String {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Record a success for the statistics and return `UVCCTL_SUCCESS`.
fn success() -> uvcctl_result_t {
    diagnostics::record_operation(ErrorCode::Success);
    uvcctl_result_t::UVCCTL_SUCCESS
}

/// Record a failure, stash its details, and convert the code.
fn failure(err: &Error) -> uvcctl_result_t {
    set_last_error(&err.description());
    diagnostics::record_operation(err.code());
    to_result_t(err.code())
}

fn failure_code(code: ErrorCode, details: &str) -> uvcctl_result_t {
    failure(&Error::new(code, details))
}

fn complete(result: Result<()>) -> uvcctl_result_t {
    match result {
        Ok(()) => success(),
        Err(err) => failure(&err),
    }
}

/// Shield the C boundary from unwinding.
fn guarded(f: impl FnOnce() -> uvcctl_result_t) -> uvcctl_result_t {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => failure_code(ErrorCode::SystemError, "internal panic"),
    }
}

/// The buffer-sizing idiom shared by every string getter.
fn copy_to_buffer(
    text: &str,
    buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    let bytes = text.as_bytes();
    let needed = bytes.len() + 1;
    if !required_size.is_null() {
        unsafe { *required_size = needed };
    }
    if buffer.is_null() || buffer_size < needed {
        return failure_code(
            ErrorCode::BufferTooSmall,
            &format!("buffer of {buffer_size} bytes, {needed} required"),
        );
    }
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer as *mut u8, bytes.len());
        *buffer.add(bytes.len()) = 0;
    }
    success()
}

unsafe fn device_ref<'a>(device: *const uvcctl_device_t) -> Option<&'a Device> {
    if device.is_null() {
        None
    } else {
        Some(&*(device as *const Device))
    }
}

unsafe fn utf8_arg<'a>(text: *const c_char) -> Option<&'a str> {
    if text.is_null() {
        return None;
    }
    CStr::from_ptr(text).to_str().ok()
}

fn cam_prop_arg(prop: uvcctl_cam_prop_t) -> Result<CamProp> {
    CamProp::from_index(prop).ok_or_else(|| {
        Error::new(
            ErrorCode::PropertyNotSupported,
            format!("unknown camera property selector {prop}"),
        )
    })
}

fn vid_prop_arg(prop: uvcctl_vid_prop_t) -> Result<VidProp> {
    VidProp::from_index(prop).ok_or_else(|| {
        Error::new(
            ErrorCode::PropertyNotSupported,
            format!("unknown video property selector {prop}"),
        )
    })
}

/* ========================================================================
 * Version and ABI management
 * ======================================================================== */

fn version_triple() -> (u32, u32, u32) {
    static PARSED: OnceLock<(u32, u32, u32)> = OnceLock::new();
    *PARSED.get_or_init(|| {
        let mut parts = crate::VERSION.split('.').map(|p| p.parse().unwrap_or(0));
        (
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
        )
    })
}

#[no_mangle]
pub extern "C" fn uvcctl_get_version() -> u32 {
    let (major, minor, patch) = version_triple();
    (major << 16) | (minor << 8) | patch
}

#[no_mangle]
pub extern "C" fn uvcctl_get_version_string() -> *const c_char {
    static VERSION_CSTR: OnceLock<CString> = OnceLock::new();
    VERSION_CSTR
        .get_or_init(|| CString::new(crate::VERSION).unwrap_or_default())
        .as_ptr()
}

/// Compatible iff the majors match and the runtime minor is at least
/// the compiled one.
#[no_mangle]
pub extern "C" fn uvcctl_check_abi_compatibility(compiled_version: u32) -> c_int {
    let runtime = uvcctl_get_version();
    let same_major = (runtime >> 16) == (compiled_version >> 16);
    let minor_ok = ((runtime >> 8) & 0xFF) >= ((compiled_version >> 8) & 0xFF);
    (same_major && minor_ok) as c_int
}

/* ========================================================================
 * Library lifecycle
 * ======================================================================== */

#[no_mangle]
pub extern "C" fn uvcctl_initialize() -> uvcctl_result_t {
    guarded(|| {
        INITIALIZED.store(true, Ordering::SeqCst);
        success()
    })
}

/// Teardown runs in a fixed order: stop hot-plug delivery, clear the
/// connection pool, release device storage, drop the log callback.
#[no_mangle]
pub extern "C" fn uvcctl_shutdown() {
    let _ = guarded(|| {
        monitor::unregister_device_change_callback();
        global_pool().clear();
        connections()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .0
            .clear();
        device_storage()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .0
            .clear();
        logging::set_log_callback(None);
        INITIALIZED.store(false, Ordering::SeqCst);
        uvcctl_result_t::UVCCTL_SUCCESS
    });
}

#[no_mangle]
pub extern "C" fn uvcctl_is_initialized() -> c_int {
    INITIALIZED.load(Ordering::SeqCst) as c_int
}

/* ========================================================================
 * Logging
 * ======================================================================== */

#[no_mangle]
pub extern "C" fn uvcctl_set_log_callback(
    callback: uvcctl_log_callback_t,
    user_data: *mut c_void,
) -> uvcctl_result_t {
    guarded(|| {
        match callback {
            Some(cb) => {
                // The pointer travels into the logging callback; the C
                // caller owns its lifetime.
                let user_data = user_data as usize;
                logging::set_log_callback(Some(Box::new(move |level, message| {
                    let Ok(text) = CString::new(message) else { return };
                    unsafe { cb(from_log_level(level), text.as_ptr(), user_data as *mut c_void) };
                })));
            }
            None => logging::set_log_callback(None),
        }
        success()
    })
}

#[no_mangle]
pub extern "C" fn uvcctl_set_log_level(level: uvcctl_log_level_t) -> uvcctl_result_t {
    logging::set_log_level(to_log_level(level));
    success()
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_log_level(level: *mut uvcctl_log_level_t) -> uvcctl_result_t {
    if level.is_null() {
        return failure_code(ErrorCode::InvalidArgument, "null level pointer");
    }
    *level = from_log_level(logging::get_log_level());
    success()
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_log_message(
    level: uvcctl_log_level_t,
    message: *const c_char,
) -> uvcctl_result_t {
    let Some(message) = utf8_arg(message) else {
        return failure_code(ErrorCode::InvalidArgument, "null or non-UTF-8 message");
    };
    logging::log_message(to_log_level(level), message);
    success()
}

macro_rules! log_level_shim {
    ($name:ident, $level:expr) => {
        #[no_mangle]
        pub unsafe extern "C" fn $name(message: *const c_char) -> uvcctl_result_t {
            uvcctl_log_message($level, message)
        }
    };
}

log_level_shim!(uvcctl_log_debug, uvcctl_log_level_t::UVCCTL_LOG_DEBUG);
log_level_shim!(uvcctl_log_info, uvcctl_log_level_t::UVCCTL_LOG_INFO);
log_level_shim!(uvcctl_log_warning, uvcctl_log_level_t::UVCCTL_LOG_WARNING);
log_level_shim!(uvcctl_log_error, uvcctl_log_level_t::UVCCTL_LOG_ERROR);
log_level_shim!(uvcctl_log_critical, uvcctl_log_level_t::UVCCTL_LOG_CRITICAL);

/* ========================================================================
 * Device enumeration
 * ======================================================================== */

/// The returned array and the device records it points at are owned by
/// the library; release the array with [`uvcctl_free_device_list`].
#[no_mangle]
pub unsafe extern "C" fn uvcctl_list_devices(
    devices: *mut *mut *mut uvcctl_device_t,
    count: *mut usize,
) -> uvcctl_result_t {
    guarded(|| {
        if devices.is_null() || count.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null output pointer");
        }

        let found = match list_devices() {
            Ok(found) => found,
            Err(err) => {
                *devices = std::ptr::null_mut();
                *count = 0;
                return failure(&err);
            }
        };

        let mut storage = device_storage().lock().unwrap_or_else(|e| e.into_inner());
        let mut handles: Vec<*mut uvcctl_device_t> = Vec::with_capacity(found.len());
        for device in found {
            let boxed = Box::new(device);
            handles.push(&*boxed as *const Device as *mut uvcctl_device_t);
            storage.0.push(boxed);
        }

        *count = handles.len();
        *devices = Box::into_raw(handles.into_boxed_slice()) as *mut *mut uvcctl_device_t;
        success()
    })
}

/// Releases the pointer array only; the device records stay owned by
/// the library until shutdown.
#[no_mangle]
pub unsafe extern "C" fn uvcctl_free_device_list(
    devices: *mut *mut uvcctl_device_t,
    count: usize,
) {
    if devices.is_null() {
        return;
    }
    drop(Box::from_raw(std::slice::from_raw_parts_mut(
        devices, count,
    ) as *mut [*mut uvcctl_device_t]));
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_is_device_connected(
    device: *const uvcctl_device_t,
    connected: *mut c_int,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), connected.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        match is_device_connected(device) {
            Ok(state) => {
                *connected = state as c_int;
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_device_name(
    device: *const uvcctl_device_t,
    name_buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    guarded(|| {
        let Some(device) = device_ref(device) else {
            return failure_code(ErrorCode::InvalidArgument, "null device");
        };
        copy_to_buffer(&device.name, name_buffer, buffer_size, required_size)
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_device_path(
    device: *const uvcctl_device_t,
    path_buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    guarded(|| {
        let Some(device) = device_ref(device) else {
            return failure_code(ErrorCode::InvalidArgument, "null device");
        };
        copy_to_buffer(&device.path, path_buffer, buffer_size, required_size)
    })
}

/* ========================================================================
 * Hot-plug monitoring
 * ======================================================================== */

#[no_mangle]
pub extern "C" fn uvcctl_register_device_change_callback(
    callback: uvcctl_device_change_callback_t,
    user_data: *mut c_void,
) -> uvcctl_result_t {
    guarded(|| {
        let Some(cb) = callback else {
            return failure_code(ErrorCode::InvalidArgument, "null callback");
        };
        let user_data = user_data as usize;
        let result = monitor::register_device_change_callback(Box::new(move |added, path| {
            let Ok(path) = CString::new(path) else { return };
            unsafe { cb(added as c_int, path.as_ptr(), user_data as *mut c_void) };
        }));
        complete(result)
    })
}

#[no_mangle]
pub extern "C" fn uvcctl_unregister_device_change_callback() -> uvcctl_result_t {
    guarded(|| {
        monitor::unregister_device_change_callback();
        success()
    })
}

/* ========================================================================
 * Connections
 * ======================================================================== */

#[no_mangle]
pub unsafe extern "C" fn uvcctl_create_connection(
    device: *const uvcctl_device_t,
    connection: *mut *mut uvcctl_connection_t,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), connection.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };

        let camera = Box::new(Camera::new(device.clone()));
        let key = &*camera as *const Camera as usize;
        connections()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .0
            .insert(key, camera);
        *connection = key as *mut uvcctl_connection_t;
        success()
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_close_connection(
    connection: *mut uvcctl_connection_t,
) -> uvcctl_result_t {
    guarded(|| {
        let removed = connections()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .0
            .remove(&(connection as usize));
        match removed {
            Some(_) => success(),
            None => failure_code(ErrorCode::InvalidArgument, "unknown connection handle"),
        }
    })
}

/// Run `op` against a registered connection. The registry lock is not
/// held across the (possibly blocking) property call.
fn with_connection<T>(
    connection: *mut uvcctl_connection_t,
    op: impl FnOnce(&Camera) -> Result<T>,
) -> Result<T> {
    let key = connection as usize;
    {
        let registry = connections().lock().unwrap_or_else(|e| e.into_inner());
        if !registry.0.contains_key(&key) {
            return Err(Error::new(
                ErrorCode::InvalidArgument,
                "unknown connection handle",
            ));
        }
    }
    // Handles are only invalidated by close/shutdown; the caller
    // contract forbids racing those against property calls.
    let camera = unsafe { &*(key as *const Camera) };
    op(camera)
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_is_connection_valid(
    connection: *mut uvcctl_connection_t,
    valid: *mut c_int,
) -> uvcctl_result_t {
    guarded(|| {
        if valid.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null output pointer");
        }
        match with_connection(connection, |camera| Ok(camera.is_valid())) {
            Ok(state) => {
                *valid = state as c_int;
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

/* ========================================================================
 * Property operations
 * ======================================================================== */

unsafe fn get_setting_common(
    device: *const uvcctl_device_t,
    setting: *mut uvcctl_prop_setting_t,
    read: impl FnOnce(&Camera) -> Result<PropSetting>,
) -> uvcctl_result_t {
    let (Some(device), false) = (device_ref(device), setting.is_null()) else {
        return failure_code(ErrorCode::InvalidArgument, "null argument");
    };
    let camera = Camera::new(device.clone());
    match read(&camera) {
        Ok(value) => {
            *setting = from_setting(value);
            success()
        }
        Err(err) => failure(&err),
    }
}

unsafe fn get_range_common(
    device: *const uvcctl_device_t,
    range: *mut uvcctl_prop_range_t,
    read: impl FnOnce(&Camera) -> Result<PropRange>,
) -> uvcctl_result_t {
    let (Some(device), false) = (device_ref(device), range.is_null()) else {
        return failure_code(ErrorCode::InvalidArgument, "null argument");
    };
    let camera = Camera::new(device.clone());
    match read(&camera) {
        Ok(value) => {
            *range = from_range(value);
            success()
        }
        Err(err) => failure(&err),
    }
}

unsafe fn set_common(
    device: *const uvcctl_device_t,
    setting: *const uvcctl_prop_setting_t,
    write: impl FnOnce(&Camera, PropSetting) -> Result<()>,
) -> uvcctl_result_t {
    let (Some(device), false) = (device_ref(device), setting.is_null()) else {
        return failure_code(ErrorCode::InvalidArgument, "null argument");
    };
    let camera = Camera::new(device.clone());
    complete(write(&camera, to_setting(&*setting)))
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_camera_property(
    device: *const uvcctl_device_t,
    prop: uvcctl_cam_prop_t,
    setting: *mut uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        let prop = match cam_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        get_setting_common(device, setting, |camera| camera.get(prop))
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_camera_property(
    device: *const uvcctl_device_t,
    prop: uvcctl_cam_prop_t,
    setting: *const uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        let prop = match cam_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        set_common(device, setting, |camera, value| camera.set(prop, value))
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_camera_property_range(
    device: *const uvcctl_device_t,
    prop: uvcctl_cam_prop_t,
    range: *mut uvcctl_prop_range_t,
) -> uvcctl_result_t {
    guarded(|| {
        let prop = match cam_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        get_range_common(device, range, |camera| camera.get_range(prop))
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_video_property(
    device: *const uvcctl_device_t,
    prop: uvcctl_vid_prop_t,
    setting: *mut uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        let prop = match vid_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        get_setting_common(device, setting, |camera| camera.get_video(prop))
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_video_property(
    device: *const uvcctl_device_t,
    prop: uvcctl_vid_prop_t,
    setting: *const uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        let prop = match vid_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        set_common(device, setting, |camera, value| {
            camera.set_video(prop, value)
        })
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_video_property_range(
    device: *const uvcctl_device_t,
    prop: uvcctl_vid_prop_t,
    range: *mut uvcctl_prop_range_t,
) -> uvcctl_result_t {
    guarded(|| {
        let prop = match vid_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        get_range_common(device, range, |camera| camera.get_video_range(prop))
    })
}

/* ========================================================================
 * Batch property operations
 * ======================================================================== */

/// Reads stop at the first failure; settings already read keep their
/// values.
#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_multiple_camera_properties(
    device: *const uvcctl_device_t,
    props: *const uvcctl_cam_prop_t,
    settings: *mut uvcctl_prop_setting_t,
    count: usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), props.is_null() || settings.is_null())
        else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let camera = Camera::new(device.clone());
        for i in 0..count {
            let prop = match cam_prop_arg(*props.add(i)) {
                Ok(prop) => prop,
                Err(err) => return failure(&err),
            };
            match camera.get(prop) {
                Ok(value) => *settings.add(i) = from_setting(value),
                Err(err) => return failure(&err),
            }
        }
        success()
    })
}

/// Writes are transactional per selector only: earlier writes stay
/// applied when a later one fails.
#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_multiple_camera_properties(
    device: *const uvcctl_device_t,
    props: *const uvcctl_cam_prop_t,
    settings: *const uvcctl_prop_setting_t,
    count: usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), props.is_null() || settings.is_null())
        else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let camera = Camera::new(device.clone());
        for i in 0..count {
            let prop = match cam_prop_arg(*props.add(i)) {
                Ok(prop) => prop,
                Err(err) => return failure(&err),
            };
            if let Err(err) = camera.set(prop, to_setting(&*settings.add(i))) {
                return failure(&err);
            }
        }
        success()
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_multiple_video_properties(
    device: *const uvcctl_device_t,
    props: *const uvcctl_vid_prop_t,
    settings: *mut uvcctl_prop_setting_t,
    count: usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), props.is_null() || settings.is_null())
        else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let camera = Camera::new(device.clone());
        for i in 0..count {
            let prop = match vid_prop_arg(*props.add(i)) {
                Ok(prop) => prop,
                Err(err) => return failure(&err),
            };
            match camera.get_video(prop) {
                Ok(value) => *settings.add(i) = from_setting(value),
                Err(err) => return failure(&err),
            }
        }
        success()
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_multiple_video_properties(
    device: *const uvcctl_device_t,
    props: *const uvcctl_vid_prop_t,
    settings: *const uvcctl_prop_setting_t,
    count: usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), props.is_null() || settings.is_null())
        else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let camera = Camera::new(device.clone());
        for i in 0..count {
            let prop = match vid_prop_arg(*props.add(i)) {
                Ok(prop) => prop,
                Err(err) => return failure(&err),
            };
            if let Err(err) = camera.set_video(prop, to_setting(&*settings.add(i))) {
                return failure(&err);
            }
        }
        success()
    })
}

/* ========================================================================
 * Connection-based property operations
 * ======================================================================== */

#[no_mangle]
pub unsafe extern "C" fn uvcctl_connection_get_camera_property(
    connection: *mut uvcctl_connection_t,
    prop: uvcctl_cam_prop_t,
    setting: *mut uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        if setting.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null output pointer");
        }
        let result = cam_prop_arg(prop)
            .and_then(|prop| with_connection(connection, |camera| camera.get(prop)));
        match result {
            Ok(value) => {
                *setting = from_setting(value);
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_connection_set_camera_property(
    connection: *mut uvcctl_connection_t,
    prop: uvcctl_cam_prop_t,
    setting: *const uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        if setting.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null setting");
        }
        let value = to_setting(&*setting);
        complete(
            cam_prop_arg(prop)
                .and_then(|prop| with_connection(connection, |camera| camera.set(prop, value))),
        )
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_connection_get_camera_property_range(
    connection: *mut uvcctl_connection_t,
    prop: uvcctl_cam_prop_t,
    range: *mut uvcctl_prop_range_t,
) -> uvcctl_result_t {
    guarded(|| {
        if range.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null output pointer");
        }
        let result = cam_prop_arg(prop)
            .and_then(|prop| with_connection(connection, |camera| camera.get_range(prop)));
        match result {
            Ok(value) => {
                *range = from_range(value);
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_connection_get_video_property(
    connection: *mut uvcctl_connection_t,
    prop: uvcctl_vid_prop_t,
    setting: *mut uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        if setting.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null output pointer");
        }
        let result = vid_prop_arg(prop)
            .and_then(|prop| with_connection(connection, |camera| camera.get_video(prop)));
        match result {
            Ok(value) => {
                *setting = from_setting(value);
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_connection_set_video_property(
    connection: *mut uvcctl_connection_t,
    prop: uvcctl_vid_prop_t,
    setting: *const uvcctl_prop_setting_t,
) -> uvcctl_result_t {
    guarded(|| {
        if setting.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null setting");
        }
        let value = to_setting(&*setting);
        complete(vid_prop_arg(prop).and_then(|prop| {
            with_connection(connection, |camera| camera.set_video(prop, value))
        }))
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_connection_get_video_property_range(
    connection: *mut uvcctl_connection_t,
    prop: uvcctl_vid_prop_t,
    range: *mut uvcctl_prop_range_t,
) -> uvcctl_result_t {
    guarded(|| {
        if range.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null output pointer");
        }
        let result = vid_prop_arg(prop)
            .and_then(|prop| with_connection(connection, |camera| camera.get_video_range(prop)));
        match result {
            Ok(value) => {
                *range = from_range(value);
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

/* ========================================================================
 * Vendor properties
 * ======================================================================== */

unsafe fn guid_arg(text: *const c_char) -> Result<Guid> {
    let Some(text) = utf8_arg(text) else {
        return Err(Error::new(
            ErrorCode::InvalidArgument,
            "null or non-UTF-8 GUID",
        ));
    };
    text.parse()
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_vendor_property(
    device: *const uvcctl_device_t,
    property_set_guid: *const c_char,
    property_id: u32,
    data: *mut c_void,
    data_size: *mut usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), data_size.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let guid = match guid_arg(property_set_guid) {
            Ok(guid) => guid,
            Err(err) => return failure(&err),
        };

        let bytes = match vendor::get_vendor_property(device, &guid, property_id) {
            Ok(bytes) => bytes,
            Err(err) => return failure(&err),
        };

        let capacity = *data_size;
        *data_size = bytes.len();
        if data.is_null() || capacity < bytes.len() {
            return failure_code(
                ErrorCode::BufferTooSmall,
                &format!("vendor data needs {} bytes", bytes.len()),
            );
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), data as *mut u8, bytes.len());
        success()
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_vendor_property(
    device: *const uvcctl_device_t,
    property_set_guid: *const c_char,
    property_id: u32,
    data: *const c_void,
    data_size: usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), data.is_null() && data_size > 0) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let guid = match guid_arg(property_set_guid) {
            Ok(guid) => guid,
            Err(err) => return failure(&err),
        };
        let bytes = if data_size == 0 {
            &[][..]
        } else {
            std::slice::from_raw_parts(data as *const u8, data_size)
        };
        complete(vendor::set_vendor_property(device, &guid, property_id, bytes))
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_query_vendor_property_support(
    device: *const uvcctl_device_t,
    property_set_guid: *const c_char,
    property_id: u32,
    supported: *mut c_int,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), supported.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let guid = match guid_arg(property_set_guid) {
            Ok(guid) => guid,
            Err(err) => return failure(&err),
        };
        match vendor::query_vendor_property_support(device, &guid, property_id) {
            Ok(flags) => {
                *supported = ((flags & (vendor::SUPPORT_GET | vendor::SUPPORT_SET)) != 0) as c_int;
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

/* ========================================================================
 * Logitech conveniences
 * ======================================================================== */

fn logitech_prop_arg(prop: uvcctl_logitech_prop_t) -> Result<LogitechProperty> {
    LogitechProperty::from_id(prop).ok_or_else(|| {
        Error::new(
            ErrorCode::InvalidArgument,
            format!("bad Logitech property {prop}"),
        )
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_supports_logitech_properties(
    device: *const uvcctl_device_t,
    supported: *mut c_int,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), supported.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        match logitech::supports_logitech_properties(device) {
            Ok(state) => {
                *supported = state as c_int;
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_logitech_property_int32(
    device: *const uvcctl_device_t,
    prop: uvcctl_logitech_prop_t,
    value: *mut i32,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), value.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let result = logitech_prop_arg(prop)
            .and_then(|prop| logitech::get_logitech_property_typed::<i32>(device, prop));
        match result {
            Ok(read) => {
                *value = read;
                success()
            }
            Err(err) => failure(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_logitech_property_int32(
    device: *const uvcctl_device_t,
    prop: uvcctl_logitech_prop_t,
    value: i32,
) -> uvcctl_result_t {
    guarded(|| {
        let Some(device) = device_ref(device) else {
            return failure_code(ErrorCode::InvalidArgument, "null device");
        };
        complete(
            logitech_prop_arg(prop)
                .and_then(|prop| logitech::set_logitech_property_typed(device, prop, value)),
        )
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_logitech_property_data(
    device: *const uvcctl_device_t,
    prop: uvcctl_logitech_prop_t,
    data: *mut c_void,
    data_size: *mut usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), data_size.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let result =
            logitech_prop_arg(prop).and_then(|prop| logitech::get_logitech_property(device, prop));
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => return failure(&err),
        };

        let capacity = *data_size;
        *data_size = bytes.len();
        if data.is_null() || capacity < bytes.len() {
            return failure_code(
                ErrorCode::BufferTooSmall,
                &format!("vendor data needs {} bytes", bytes.len()),
            );
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), data as *mut u8, bytes.len());
        success()
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_set_logitech_property_data(
    device: *const uvcctl_device_t,
    prop: uvcctl_logitech_prop_t,
    data: *const c_void,
    data_size: usize,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), data.is_null() && data_size > 0) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let bytes = if data_size == 0 {
            &[][..]
        } else {
            std::slice::from_raw_parts(data as *const u8, data_size)
        };
        complete(
            logitech_prop_arg(prop)
                .and_then(|prop| logitech::set_logitech_property(device, prop, bytes)),
        )
    })
}

/* ========================================================================
 * String names
 * ======================================================================== */

#[no_mangle]
pub extern "C" fn uvcctl_get_camera_property_name(prop: uvcctl_cam_prop_t) -> *const c_char {
    match CamProp::from_index(prop) {
        Some(CamProp::Pan) => c"Pan".as_ptr(),
        Some(CamProp::Tilt) => c"Tilt".as_ptr(),
        Some(CamProp::Roll) => c"Roll".as_ptr(),
        Some(CamProp::Zoom) => c"Zoom".as_ptr(),
        Some(CamProp::Exposure) => c"Exposure".as_ptr(),
        Some(CamProp::Iris) => c"Iris".as_ptr(),
        Some(CamProp::Focus) => c"Focus".as_ptr(),
        Some(CamProp::ScanMode) => c"ScanMode".as_ptr(),
        Some(CamProp::Privacy) => c"Privacy".as_ptr(),
        Some(CamProp::PanRelative) => c"PanRelative".as_ptr(),
        Some(CamProp::TiltRelative) => c"TiltRelative".as_ptr(),
        Some(CamProp::RollRelative) => c"RollRelative".as_ptr(),
        Some(CamProp::ZoomRelative) => c"ZoomRelative".as_ptr(),
        Some(CamProp::ExposureRelative) => c"ExposureRelative".as_ptr(),
        Some(CamProp::IrisRelative) => c"IrisRelative".as_ptr(),
        Some(CamProp::FocusRelative) => c"FocusRelative".as_ptr(),
        Some(CamProp::PanTilt) => c"PanTilt".as_ptr(),
        Some(CamProp::PanTiltRelative) => c"PanTiltRelative".as_ptr(),
        Some(CamProp::FocusSimple) => c"FocusSimple".as_ptr(),
        Some(CamProp::DigitalZoom) => c"DigitalZoom".as_ptr(),
        Some(CamProp::DigitalZoomRelative) => c"DigitalZoomRelative".as_ptr(),
        Some(CamProp::BacklightCompensation) => c"BacklightCompensation".as_ptr(),
        Some(CamProp::Lamp) => c"Lamp".as_ptr(),
        None => c"Unknown".as_ptr(),
    }
}

#[no_mangle]
pub extern "C" fn uvcctl_get_video_property_name(prop: uvcctl_vid_prop_t) -> *const c_char {
    match VidProp::from_index(prop) {
        Some(VidProp::Brightness) => c"Brightness".as_ptr(),
        Some(VidProp::Contrast) => c"Contrast".as_ptr(),
        Some(VidProp::Hue) => c"Hue".as_ptr(),
        Some(VidProp::Saturation) => c"Saturation".as_ptr(),
        Some(VidProp::Sharpness) => c"Sharpness".as_ptr(),
        Some(VidProp::Gamma) => c"Gamma".as_ptr(),
        Some(VidProp::ColorEnable) => c"ColorEnable".as_ptr(),
        Some(VidProp::WhiteBalance) => c"WhiteBalance".as_ptr(),
        Some(VidProp::BacklightCompensation) => c"BacklightCompensation".as_ptr(),
        Some(VidProp::Gain) => c"Gain".as_ptr(),
        None => c"Unknown".as_ptr(),
    }
}

#[no_mangle]
pub extern "C" fn uvcctl_get_camera_mode_name(mode: uvcctl_cam_mode_t) -> *const c_char {
    match mode {
        uvcctl_cam_mode_t::UVCCTL_CAM_MODE_AUTO => c"AUTO".as_ptr(),
        uvcctl_cam_mode_t::UVCCTL_CAM_MODE_MANUAL => c"MANUAL".as_ptr(),
    }
}

#[no_mangle]
pub extern "C" fn uvcctl_get_log_level_name(level: uvcctl_log_level_t) -> *const c_char {
    match level {
        uvcctl_log_level_t::UVCCTL_LOG_DEBUG => c"DEBUG".as_ptr(),
        uvcctl_log_level_t::UVCCTL_LOG_INFO => c"INFO".as_ptr(),
        uvcctl_log_level_t::UVCCTL_LOG_WARNING => c"WARNING".as_ptr(),
        uvcctl_log_level_t::UVCCTL_LOG_ERROR => c"ERROR".as_ptr(),
        uvcctl_log_level_t::UVCCTL_LOG_CRITICAL => c"CRITICAL".as_ptr(),
    }
}

#[no_mangle]
pub extern "C" fn uvcctl_get_logitech_property_name(
    prop: uvcctl_logitech_prop_t,
) -> *const c_char {
    match LogitechProperty::from_id(prop) {
        Some(LogitechProperty::RightLight) => c"RightLight".as_ptr(),
        Some(LogitechProperty::RightSound) => c"RightSound".as_ptr(),
        Some(LogitechProperty::FaceTracking) => c"FaceTracking".as_ptr(),
        Some(LogitechProperty::LedIndicator) => c"LedIndicator".as_ptr(),
        Some(LogitechProperty::ProcessorUsage) => c"ProcessorUsage".as_ptr(),
        Some(LogitechProperty::RawDataBits) => c"RawDataBits".as_ptr(),
        Some(LogitechProperty::FocusAssist) => c"FocusAssist".as_ptr(),
        Some(LogitechProperty::VideoStandard) => c"VideoStandard".as_ptr(),
        Some(LogitechProperty::DigitalZoomRoi) => c"DigitalZoomRoi".as_ptr(),
        Some(LogitechProperty::TiltPan) => c"TiltPan".as_ptr(),
        None => c"Unknown".as_ptr(),
    }
}

/* ========================================================================
 * Value validation helpers
 * ======================================================================== */

#[no_mangle]
pub unsafe extern "C" fn uvcctl_is_value_valid(
    range: *const uvcctl_prop_range_t,
    value: i32,
) -> c_int {
    if range.is_null() {
        return 0;
    }
    to_range(&*range).is_valid(value) as c_int
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_clamp_value(
    range: *const uvcctl_prop_range_t,
    value: i32,
) -> i32 {
    if range.is_null() {
        return value;
    }
    to_range(&*range).clamp(value)
}

/// Step once up or down from `current_value`; `InvalidValue` at the
/// range limit.
#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_next_valid_value(
    range: *const uvcctl_prop_range_t,
    current_value: i32,
    increment: c_int,
    next_value: *mut i32,
) -> uvcctl_result_t {
    guarded(|| {
        if range.is_null() || next_value.is_null() {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        }
        let range = to_range(&*range);
        let step = range.step.max(1);
        let candidate = if increment != 0 {
            current_value.saturating_add(step)
        } else {
            current_value.saturating_sub(step)
        };
        if candidate < range.min || candidate > range.max {
            return failure_code(ErrorCode::InvalidValue, "at range limit");
        }
        *next_value = range.clamp(candidate);
        success()
    })
}

/* ========================================================================
 * Capabilities
 * ======================================================================== */

/// JSON capability snapshot via the buffer-sizing idiom.
#[no_mangle]
pub unsafe extern "C" fn uvcctl_get_device_capabilities(
    device: *const uvcctl_device_t,
    buffer: *mut c_char,
    buffer_size: usize,
    required_size: *mut usize,
) -> uvcctl_result_t {
    guarded(|| {
        let Some(device) = device_ref(device) else {
            return failure_code(ErrorCode::InvalidArgument, "null device");
        };
        let caps = match device_capabilities(device) {
            Ok(caps) => caps,
            Err(err) => return failure(&err),
        };
        let json = match serde_json::to_string_pretty(&caps) {
            Ok(json) => json,
            Err(err) => {
                return failure_code(
                    ErrorCode::SystemError,
                    &format!("capability serialization failed: {err}"),
                )
            }
        };
        copy_to_buffer(&json, buffer, buffer_size, required_size)
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_is_camera_property_supported(
    device: *const uvcctl_device_t,
    prop: uvcctl_cam_prop_t,
    supported: *mut c_int,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), supported.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let prop = match cam_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        let camera = Camera::new(device.clone());
        *supported = camera.get_range(prop).is_ok() as c_int;
        success()
    })
}

#[no_mangle]
pub unsafe extern "C" fn uvcctl_is_video_property_supported(
    device: *const uvcctl_device_t,
    prop: uvcctl_vid_prop_t,
    supported: *mut c_int,
) -> uvcctl_result_t {
    guarded(|| {
        let (Some(device), false) = (device_ref(device), supported.is_null()) else {
            return failure_code(ErrorCode::InvalidArgument, "null argument");
        };
        let prop = match vid_prop_arg(prop) {
            Ok(prop) => prop,
            Err(err) => return failure(&err),
        };
        let camera = Camera::new(device.clone());
        *supported = camera.get_video_range(prop).is_ok() as c_int;
        success()
    })
}
