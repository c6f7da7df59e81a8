//! The public camera handle.

use std::sync::{Arc, Mutex};

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::props::{CamProp, VidProp};
use uvcctl_core::traits::DeviceControl;
use uvcctl_core::types::{Device, PropRange, PropSetting};

use crate::platform::{find_device_by_path, is_device_connected, list_devices};
use crate::pool::global_pool;

/// RAII handle to one camera.
///
/// The connection is acquired lazily from the connection pool on the
/// first property operation; construction itself never opens the
/// device. The handle is move-only.
pub struct Camera {
    device: Device,
    connection: Mutex<Option<Arc<dyn DeviceControl>>>,
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera").field("device", &self.device).finish()
    }
}

impl Camera {
    /// Handle for a known device record. The device is not opened and
    /// not verified here; see [`open_camera`] for the checked variant.
    pub fn new(device: Device) -> Self {
        Self {
            device,
            connection: Mutex::new(None),
        }
    }

    /// Handle for the `index`-th device of the current enumeration.
    pub fn by_index(index: usize) -> Result<Self> {
        let devices = list_devices()?;
        let device = devices.into_iter().nth(index).ok_or_else(|| {
            Error::new(
                ErrorCode::DeviceNotFound,
                format!("device index {index} out of range"),
            )
        })?;
        Ok(Self::new(device))
    }

    /// Handle for a device path.
    pub fn by_path(path: &str) -> Result<Self> {
        Ok(Self::new(find_device_by_path(path)?))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Valid iff the record identifies a device that is currently
    /// present in enumeration.
    pub fn is_valid(&self) -> bool {
        self.device.is_valid() && is_device_connected(&self.device).unwrap_or(false)
    }

    /// Pool-backed connection, acquired on first use. A cached
    /// connection that has gone invalid is evicted and reported as
    /// `DeviceNotFound`.
    fn connection(&self) -> Result<Arc<dyn DeviceControl>> {
        let mut slot = self.connection.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(conn) = &*slot {
            if conn.is_valid() {
                return Ok(conn.clone());
            }
            global_pool().release(&self.device);
            *slot = None;
            return Err(Error::new(
                ErrorCode::DeviceNotFound,
                format!("{}: device connection lost", self.device),
            ));
        }

        let conn = global_pool().acquire(&self.device).map_err(|e| {
            if e.code() == ErrorCode::NotImplemented {
                e
            } else {
                e.with_context("camera")
            }
        })?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    pub fn get(&self, prop: CamProp) -> Result<PropSetting> {
        self.connection()?.camera_get(prop)
    }

    pub fn set(&self, prop: CamProp, setting: PropSetting) -> Result<()> {
        self.connection()?.camera_set(prop, setting)
    }

    pub fn get_range(&self, prop: CamProp) -> Result<PropRange> {
        self.connection()?.camera_range(prop)
    }

    pub fn get_video(&self, prop: VidProp) -> Result<PropSetting> {
        self.connection()?.video_get(prop)
    }

    pub fn set_video(&self, prop: VidProp, setting: PropSetting) -> Result<()> {
        self.connection()?.video_set(prop, setting)
    }

    pub fn get_video_range(&self, prop: VidProp) -> Result<PropRange> {
        self.connection()?.video_range(prop)
    }
}

/// Open a camera for a known device record, verifying it is present.
pub fn open_camera(device: &Device) -> Result<Camera> {
    if !device.is_valid() {
        return Err(Error::new(ErrorCode::InvalidArgument, "invalid device"));
    }
    if !is_device_connected(device)? {
        return Err(Error::new(
            ErrorCode::DeviceNotFound,
            format!("device not connected: {device}"),
        ));
    }
    Ok(Camera::new(device.clone()))
}

/// Open the `index`-th device of the current enumeration.
pub fn open_camera_by_index(index: usize) -> Result<Camera> {
    let devices = list_devices()?;
    match devices.into_iter().nth(index) {
        Some(device) => open_camera(&device),
        None => Err(Error::new(
            ErrorCode::DeviceNotFound,
            format!("device index {index} out of range"),
        )),
    }
}

/// Open a camera by device path.
pub fn open_camera_by_path(path: &str) -> Result<Camera> {
    let device = find_device_by_path(path)?;
    open_camera(&device)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_invalid_device_is_invalid_argument() {
        let err = open_camera(&Device::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[cfg(not(target_os = "windows"))]
    mod stub {
        use super::*;
        use uvcctl_core::types::CamMode;

        #[test]
        fn open_missing_device_is_device_not_found() {
            let err = open_camera(&Device::new("Cam", "path")).unwrap_err();
            assert_eq!(err.code(), ErrorCode::DeviceNotFound);
        }

        #[test]
        fn open_by_index_out_of_range() {
            let err = open_camera_by_index(0).unwrap_err();
            assert_eq!(err.code(), ErrorCode::DeviceNotFound);
        }

        #[test]
        fn open_by_missing_path() {
            let err = open_camera_by_path("\\\\?\\usb#vid_0000").unwrap_err();
            assert_eq!(err.code(), ErrorCode::DeviceNotFound);
        }

        #[test]
        fn unopened_handle_reports_not_implemented_off_windows() {
            // Off Windows the connection layer itself is a stub; the
            // first property access reports that instead of guessing.
            let camera = Camera::new(Device::new("Cam", "path"));
            let err = camera
                .set(CamProp::Zoom, PropSetting::new(1, CamMode::Manual))
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotImplemented);
        }

        #[test]
        fn camera_is_not_valid_without_backend() {
            let camera = Camera::new(Device::new("Cam", "path"));
            assert!(!camera.is_valid());
        }
    }
}
