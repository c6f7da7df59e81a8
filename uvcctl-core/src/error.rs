use std::fmt;

use thiserror::Error;

/// Error categories shared by every layer of the library.
///
/// The discriminant values are ABI-stable: the C surface exposes them
/// verbatim, so new codes may only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum ErrorCode {
    /// Operation succeeded (only ever crosses the C surface).
    Success = 0,
    /// Device not found or disconnected.
    DeviceNotFound,
    /// Device is busy or held exclusively by another client.
    DeviceBusy,
    /// Property not supported by the device.
    PropertyNotSupported,
    /// Property value out of range, unaligned, or size mismatch.
    InvalidValue,
    /// Insufficient permissions.
    PermissionDenied,
    /// Other host/platform error.
    SystemError,
    /// Invalid function argument.
    InvalidArgument,
    /// Feature not implemented on this platform.
    NotImplemented,
    /// Bind succeeded but the resulting interfaces were unusable.
    ConnectionFailed,
    /// Operation timed out.
    Timeout,
    /// Provided buffer is too small (C surface only).
    BufferTooSmall,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 12] = [
        ErrorCode::Success,
        ErrorCode::DeviceNotFound,
        ErrorCode::DeviceBusy,
        ErrorCode::PropertyNotSupported,
        ErrorCode::InvalidValue,
        ErrorCode::PermissionDenied,
        ErrorCode::SystemError,
        ErrorCode::InvalidArgument,
        ErrorCode::NotImplemented,
        ErrorCode::ConnectionFailed,
        ErrorCode::Timeout,
        ErrorCode::BufferTooSmall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::DeviceNotFound => "DeviceNotFound",
            ErrorCode::DeviceBusy => "DeviceBusy",
            ErrorCode::PropertyNotSupported => "PropertyNotSupported",
            ErrorCode::InvalidValue => "InvalidValue",
            ErrorCode::PermissionDenied => "PermissionDenied",
            ErrorCode::SystemError => "SystemError",
            ErrorCode::InvalidArgument => "InvalidArgument",
            ErrorCode::NotImplemented => "NotImplemented",
            ErrorCode::ConnectionFailed => "ConnectionFailed",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::BufferTooSmall => "BufferTooSmall",
        }
    }

    /// Whether a caller-driven retry loop has a chance of succeeding.
    pub fn is_temporary(self) -> bool {
        matches!(
            self,
            ErrorCode::DeviceBusy | ErrorCode::Timeout | ErrorCode::ConnectionFailed
        )
    }

    /// Whether the failure concerns the device itself rather than the call.
    pub fn is_device_error(self) -> bool {
        matches!(
            self,
            ErrorCode::DeviceNotFound | ErrorCode::DeviceBusy | ErrorCode::ConnectionFailed
        )
    }

    pub fn is_permission_error(self) -> bool {
        self == ErrorCode::PermissionDenied
    }

    /// Errors most likely caused by incorrect API usage.
    pub fn is_user_error(self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidArgument | ErrorCode::InvalidValue | ErrorCode::BufferTooSmall
        )
    }

    pub fn should_retry(self) -> bool {
        self.is_temporary()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error with a category and a human-readable context message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.description())]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an error without extra context.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `"Code: message"`, or just `"Code"` when the message is empty.
    pub fn description(&self) -> String {
        if self.message.is_empty() {
            self.code.as_str().to_string()
        } else {
            format!("{}: {}", self.code.as_str(), self.message)
        }
    }

    /// Attach component/operation context without changing the category.
    pub fn with_context(self, context: &str) -> Self {
        let message = if self.message.is_empty() {
            context.to_string()
        } else {
            format!("{}: {}", context, self.message)
        };
        Self {
            code: self.code,
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_includes_message_when_present() {
        let err = Error::new(ErrorCode::DeviceNotFound, "no such camera");
        assert_eq!(err.description(), "DeviceNotFound: no such camera");
        assert_eq!(err.to_string(), "DeviceNotFound: no such camera");
    }

    #[test]
    fn description_omits_empty_message() {
        let err = Error::from_code(ErrorCode::Timeout);
        assert_eq!(err.description(), "Timeout");
    }

    #[test]
    fn temporary_classification() {
        assert!(ErrorCode::DeviceBusy.is_temporary());
        assert!(ErrorCode::Timeout.is_temporary());
        assert!(ErrorCode::ConnectionFailed.is_temporary());
        assert!(!ErrorCode::DeviceNotFound.is_temporary());
        assert!(!ErrorCode::PermissionDenied.is_temporary());
        assert!(!ErrorCode::InvalidValue.is_temporary());
    }

    #[test]
    fn retry_matches_temporary() {
        for code in ErrorCode::ALL {
            assert_eq!(code.should_retry(), code.is_temporary());
        }
    }

    #[test]
    fn user_error_classification() {
        assert!(ErrorCode::InvalidArgument.is_user_error());
        assert!(ErrorCode::BufferTooSmall.is_user_error());
        assert!(!ErrorCode::SystemError.is_user_error());
    }

    #[test]
    fn context_prepends_component() {
        let err = Error::new(ErrorCode::SystemError, "Get failed").with_context("camera");
        assert_eq!(err.message(), "camera: Get failed");
        assert_eq!(err.code(), ErrorCode::SystemError);
    }
}
