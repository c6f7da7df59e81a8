//! HRESULT decoding and classification into library error codes.

use windows::core::HRESULT;
use windows::Win32::Foundation::{E_ACCESSDENIED, E_NOTIMPL};

use uvcctl_core::error::{Error, ErrorCode};

// strmif.h / winerror.h values the windows crate does not re-export
// under stable names.
const VFW_E_DEVICE_IN_USE: HRESULT = HRESULT(0x80040228u32 as i32);
const VFW_E_CANNOT_CONNECT: HRESULT = HRESULT(0x80040217u32 as i32);
const E_PROP_ID_UNSUPPORTED: HRESULT = HRESULT(0x80070490u32 as i32);
const E_PROP_SET_UNSUPPORTED: HRESULT = HRESULT(0x80070492u32 as i32);
const ERROR_DEVICE_NOT_CONNECTED: u32 = 1167;
const ERROR_FILE_NOT_FOUND: u32 = 2;
const ERROR_NOT_FOUND: u32 = 1168;

/// Localized message for an HRESULT where the system has one, else a
/// stable hex spelling.
pub fn decode_hresult(hr: HRESULT) -> String {
    let message = windows::core::Error::from_hresult(hr).message();
    if message.is_empty() {
        format!("HRESULT 0x{:08X}", hr.0 as u32)
    } else {
        message.trim_end().to_string()
    }
}

/// As [`decode_hresult`] but for raw Win32 error codes.
pub fn decode_win32_error(code: u32) -> String {
    decode_hresult(HRESULT::from_win32(code))
}

/// As [`decode_hresult`] for callers that carry the raw `i32` value.
pub fn decode_hresult_code(code: i32) -> String {
    decode_hresult(HRESULT(code))
}

/// `"0x8007001F - <message>"` detail form used by the last-error slot.
pub fn hresult_details(hr: HRESULT) -> String {
    format!("0x{:08X} - {}", hr.0 as u32, decode_hresult(hr))
}

fn classify(hr: HRESULT) -> ErrorCode {
    if hr == E_ACCESSDENIED {
        return ErrorCode::PermissionDenied;
    }
    if hr == E_NOTIMPL || hr == E_PROP_ID_UNSUPPORTED || hr == E_PROP_SET_UNSUPPORTED {
        return ErrorCode::PropertyNotSupported;
    }
    if hr == VFW_E_DEVICE_IN_USE {
        return ErrorCode::DeviceBusy;
    }
    if hr == VFW_E_CANNOT_CONNECT {
        return ErrorCode::ConnectionFailed;
    }
    if hr == HRESULT::from_win32(ERROR_DEVICE_NOT_CONNECTED)
        || hr == HRESULT::from_win32(ERROR_FILE_NOT_FOUND)
        || hr == HRESULT::from_win32(ERROR_NOT_FOUND)
    {
        return ErrorCode::DeviceNotFound;
    }
    ErrorCode::SystemError
}

/// Map a failed host call to a library error, keeping the failing
/// operation and the full HRESULT detail as context.
pub fn host_error(hr: HRESULT, operation: &str) -> Error {
    Error::new(classify(hr), format!("{operation}: {}", hresult_details(hr)))
}

/// Host failure that is always reported as `SystemError` (setup paths
/// where a finer category would be misleading).
pub fn system_error(hr: HRESULT, operation: &str) -> Error {
    Error::new(
        ErrorCode::SystemError,
        format!("{operation}: {}", decode_hresult(hr)),
    )
}

pub(crate) fn map_windows_error(e: windows::core::Error, operation: &str) -> Error {
    host_error(e.code(), operation)
}
