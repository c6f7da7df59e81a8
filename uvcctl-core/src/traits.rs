//! Seams between the facade and the platform backends.

use std::sync::Arc;

use crate::error::Result;
use crate::props::{CamProp, VidProp};
use crate::types::{Device, PropRange, PropSetting};

/// A live, ready-to-use handle to one device exposing uniform
/// get/set/range over both property domains.
///
/// State machine: a connection opens valid and turns invalid
/// permanently on the first device-not-found or connection-failed host
/// error; an invalid connection answers every operation with
/// `DeviceNotFound` until dropped.
pub trait DeviceControl: Send + Sync + std::fmt::Debug {
    fn is_valid(&self) -> bool;

    fn device(&self) -> &Device;

    fn camera_get(&self, prop: CamProp) -> Result<PropSetting>;
    fn camera_set(&self, prop: CamProp, setting: PropSetting) -> Result<()>;
    fn camera_range(&self, prop: CamProp) -> Result<PropRange>;

    fn video_get(&self, prop: VidProp) -> Result<PropSetting>;
    fn video_set(&self, prop: VidProp, setting: PropSetting) -> Result<()>;
    fn video_range(&self, prop: VidProp) -> Result<PropRange>;
}

/// Abstract factory over one OS camera stack.
///
/// The Windows implementation drives DirectShow; other platforms get a
/// stub that returns empty enumerations and `NotImplemented` on
/// connection attempts.
pub trait PlatformInterface: Send + Sync {
    /// Currently-present video-input devices, in host enumeration
    /// order. An empty list is success.
    fn list_devices(&self) -> Result<Vec<Device>>;

    /// True iff the device appears in a fresh enumeration. A busy
    /// device still counts as connected; exclusive-use conflicts
    /// surface as `DeviceBusy` from operations instead.
    fn is_device_connected(&self, device: &Device) -> Result<bool>;

    /// Open a connection. `DeviceNotFound` when absent, `DeviceBusy`
    /// when the host refuses the bind with an in-use indication,
    /// `ConnectionFailed` when the bind succeeds but the control
    /// interfaces are unusable.
    fn create_connection(&self, device: &Device) -> Result<Arc<dyn DeviceControl>>;
}
