#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

pub mod capability;
pub mod error;
pub mod guid;
pub mod logging;
pub mod props;
pub mod traits;
pub mod types;

pub mod prelude {
    pub use crate::capability::{DeviceCapabilities, PropertyCapability};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::guid::Guid;
    pub use crate::props::{CamProp, VidProp};
    pub use crate::traits::{DeviceControl, PlatformInterface};
    pub use crate::types::{CamMode, Device, PropRange, PropSetting};
}

/// Library version as recorded in the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
