#![warn(rust_2018_idioms)]

//! Programmatic control of UVC camera properties on Windows.
//!
//! The library is a synchronous control plane over the DirectShow
//! stack: enumerate devices, open a [`Camera`], read and write camera
//! and video-processing properties, and reach vendor property sets.
//! On non-Windows targets every enumeration is empty and connection
//! attempts report `NotImplemented`.

pub mod camera;
pub mod capability;
pub mod capi;
pub mod diagnostics;
pub mod monitor;
pub mod platform;
pub mod pool;
pub mod vendor;

pub use uvcctl_core::capability::{DeviceCapabilities, PropertyCapability};
pub use uvcctl_core::error::{Error, ErrorCode, Result};
pub use uvcctl_core::guid::Guid;
pub use uvcctl_core::logging::{
    get_log_level, log_critical, log_debug, log_error, log_info, log_message, log_warning,
    set_log_callback, set_log_level, LogCallback, LogLevel,
};
pub use uvcctl_core::props::{CamProp, VidProp};
pub use uvcctl_core::types::{CamMode, Device, PropRange, PropSetting};

pub use camera::{open_camera, open_camera_by_index, open_camera_by_path, Camera};
pub use capability::{device_capabilities, device_capabilities_by_index};
pub use platform::{find_device_by_path, is_device_connected, list_devices};

pub mod prelude {
    pub use crate::camera::{open_camera, Camera};
    pub use crate::platform::{is_device_connected, list_devices};
    pub use uvcctl_core::prelude::*;
}

/// Library version as recorded in the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
