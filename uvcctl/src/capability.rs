//! Capability scanning.

use uvcctl_core::capability::{DeviceCapabilities, PropertyCapability};
use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::props::{CamProp, VidProp};
use uvcctl_core::types::Device;

use crate::camera::Camera;
use crate::platform::{is_device_connected, list_devices};

/// A failure that means the device itself stopped answering, as
/// opposed to one property being unsupported.
fn is_transient_device_error(err: &Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::DeviceNotFound
            | ErrorCode::ConnectionFailed
            | ErrorCode::DeviceBusy
            | ErrorCode::Timeout
            | ErrorCode::NotImplemented
    )
}

fn scan(caps: &mut DeviceCapabilities) {
    // The scan runs through a short-lived camera so it exercises the
    // same pooled access path as regular clients.
    let camera = Camera::new(caps.device.clone());

    for prop in CamProp::ALL {
        match camera.get_range(prop) {
            Ok(range) => {
                let current = camera.get(prop).unwrap_or_else(|_| range.default_setting());
                caps.camera.insert(prop, PropertyCapability::new(range, current));
            }
            Err(err) if is_transient_device_error(&err) => {
                caps.reset();
                return;
            }
            Err(_) => {} // property unsupported; no entry
        }
    }

    for prop in VidProp::ALL {
        match camera.get_video_range(prop) {
            Ok(range) => {
                let current = camera
                    .get_video(prop)
                    .unwrap_or_else(|_| range.default_setting());
                caps.video.insert(prop, PropertyCapability::new(range, current));
            }
            Err(err) if is_transient_device_error(&err) => {
                caps.reset();
                return;
            }
            Err(_) => {}
        }
    }
}

/// Probe every known property of `device` and snapshot the results.
pub fn device_capabilities(device: &Device) -> Result<DeviceCapabilities> {
    if !device.is_valid() {
        return Err(Error::new(ErrorCode::InvalidArgument, "invalid device"));
    }

    let mut caps = DeviceCapabilities::new(device.clone());
    caps.accessible = is_device_connected(device).unwrap_or(false);
    if caps.accessible {
        scan(&mut caps);
    }
    Ok(caps)
}

/// Snapshot for the `index`-th enumerated device.
pub fn device_capabilities_by_index(index: usize) -> Result<DeviceCapabilities> {
    let devices = list_devices()?;
    match devices.into_iter().nth(index) {
        Some(device) => device_capabilities(&device),
        None => Err(Error::new(
            ErrorCode::DeviceNotFound,
            format!("device index {index} out of range"),
        )),
    }
}

/// Rescan an existing snapshot in place.
pub fn refresh(caps: &mut DeviceCapabilities) -> Result<()> {
    caps.reset();
    caps.accessible = is_device_connected(&caps.device).unwrap_or(false);
    if !caps.accessible {
        return Err(Error::new(
            ErrorCode::DeviceNotFound,
            format!("device not connected: {}", caps.device),
        ));
    }
    scan(caps);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_device_is_rejected() {
        let err = device_capabilities(&Device::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[cfg(not(target_os = "windows"))]
    mod stub {
        use super::*;

        #[test]
        fn snapshot_of_absent_device_is_inaccessible_and_empty() {
            let caps = device_capabilities(&Device::new("Cam", "path")).unwrap();
            assert!(!caps.accessible);
            assert!(caps.camera.is_empty());
            assert!(caps.video.is_empty());
        }

        #[test]
        fn by_index_reports_missing_device() {
            let err = device_capabilities_by_index(0).unwrap_err();
            assert_eq!(err.code(), ErrorCode::DeviceNotFound);
        }

        #[test]
        fn refresh_fails_when_device_is_gone() {
            let mut caps = DeviceCapabilities::new(Device::new("Cam", "path"));
            let err = refresh(&mut caps).unwrap_err();
            assert_eq!(err.code(), ErrorCode::DeviceNotFound);
            assert!(!caps.accessible);
        }
    }
}
