#![cfg(target_os = "windows")]
#![warn(rust_2018_idioms)]

pub mod com;
pub mod connection;
pub mod decode;
pub mod enumerate;
pub mod ks_properties;

use std::sync::Arc;

use uvcctl_core::error::Result;
use uvcctl_core::traits::{DeviceControl, PlatformInterface};
use uvcctl_core::types::Device;

use crate::connection::DshowConnection;

/// DirectShow implementation of the platform seam.
#[derive(Debug, Clone, Default)]
pub struct DshowPlatform;

impl DshowPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformInterface for DshowPlatform {
    fn list_devices(&self) -> Result<Vec<Device>> {
        enumerate::list_devices()
    }

    fn is_device_connected(&self, device: &Device) -> Result<bool> {
        enumerate::is_device_connected(device)
    }

    fn create_connection(&self, device: &Device) -> Result<Arc<dyn DeviceControl>> {
        let conn = DshowConnection::open(device)?;
        Ok(Arc::new(conn))
    }
}

pub fn default_platform() -> Arc<dyn PlatformInterface> {
    Arc::new(DshowPlatform::new())
}

/// Whether the DirectShow stack answers at all; used by diagnostics.
pub fn host_stack_available() -> bool {
    enumerate::probe_host_stack()
}
