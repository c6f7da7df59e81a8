//! Platform factory and the top-level enumeration functions.

use std::sync::Arc;
use std::sync::OnceLock;

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::traits::{DeviceControl, PlatformInterface};
use uvcctl_core::types::Device;

/// Stub arm for targets without a camera stack: enumerations are
/// empty, connection attempts report `NotImplemented`.
#[derive(Debug, Clone, Default)]
pub struct StubPlatform;

impl PlatformInterface for StubPlatform {
    fn list_devices(&self) -> Result<Vec<Device>> {
        Ok(Vec::new())
    }

    fn is_device_connected(&self, _device: &Device) -> Result<bool> {
        Ok(false)
    }

    fn create_connection(&self, device: &Device) -> Result<Arc<dyn DeviceControl>> {
        Err(Error::new(
            ErrorCode::NotImplemented,
            format!("no camera backend on this platform (device {device})"),
        ))
    }
}

fn create_platform() -> Arc<dyn PlatformInterface> {
    #[cfg(target_os = "windows")]
    {
        return uvcctl_backend_dshow::default_platform();
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(StubPlatform)
    }
}

/// Process-wide platform instance.
pub fn platform() -> &'static Arc<dyn PlatformInterface> {
    static PLATFORM: OnceLock<Arc<dyn PlatformInterface>> = OnceLock::new();
    PLATFORM.get_or_init(create_platform)
}

/// Enumerate currently-present video-input devices in host order.
/// An empty list is success.
pub fn list_devices() -> Result<Vec<Device>> {
    platform().list_devices()
}

/// True iff the device appears in a fresh enumeration.
pub fn is_device_connected(device: &Device) -> Result<bool> {
    platform().is_device_connected(device)
}

/// Resolve a device path to its full record, or `DeviceNotFound`.
pub fn find_device_by_path(path: &str) -> Result<Device> {
    if path.is_empty() {
        return Err(Error::new(ErrorCode::InvalidArgument, "empty device path"));
    }

    #[cfg(target_os = "windows")]
    {
        uvcctl_backend_dshow::enumerate::find_device_by_path(path)
    }
    #[cfg(not(target_os = "windows"))]
    {
        let probe = Device::new("", path);
        let devices = platform().list_devices()?;
        devices
            .into_iter()
            .find(|d| probe.matches(&d.name, &d.path))
            .ok_or_else(|| {
                Error::new(
                    ErrorCode::DeviceNotFound,
                    format!("no video device with path {path}"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_platform_lists_nothing() {
        let stub = StubPlatform;
        assert_eq!(stub.list_devices().unwrap().len(), 0);
        assert!(!stub
            .is_device_connected(&Device::new("Cam", "path"))
            .unwrap());
    }

    #[test]
    fn stub_platform_refuses_connections() {
        let stub = StubPlatform;
        let err = stub
            .create_connection(&Device::new("Cam", "path"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotImplemented);
    }

    #[test]
    fn find_by_empty_path_is_invalid_argument() {
        let err = find_device_by_path("").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn find_by_path_reports_missing_device() {
        let err = find_device_by_path("\\\\?\\usb#vid_0000").unwrap_err();
        assert_eq!(err.code(), ErrorCode::DeviceNotFound);
    }
}
