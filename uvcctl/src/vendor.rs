//! Vendor-defined property sets: opaque `(GUID, id)` get/set/query,
//! plus Logitech conveniences.

use uvcctl_core::error::Result;
use uvcctl_core::guid::Guid;
use uvcctl_core::types::Device;

/// Support-bitfield flags returned by [`query_vendor_property_support`].
pub const SUPPORT_GET: u32 = 0x0001;
pub const SUPPORT_SET: u32 = 0x0002;

/// A vendor property triple. `data` is opaque to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorProperty {
    pub property_set: Guid,
    pub property_id: u32,
    pub data: Vec<u8>,
}

#[cfg(target_os = "windows")]
mod imp {
    use super::*;
    use uvcctl_backend_dshow::ks_properties::KsPropertySet;

    pub(super) fn query_support(device: &Device, set: &Guid, id: u32) -> Result<u32> {
        KsPropertySet::open(device)?.query_support(set, id)
    }

    pub(super) fn get(device: &Device, set: &Guid, id: u32) -> Result<Vec<u8>> {
        KsPropertySet::open(device)?.get_property(set, id)
    }

    pub(super) fn set(device: &Device, set: &Guid, id: u32, data: &[u8]) -> Result<()> {
        KsPropertySet::open(device)?.set_property(set, id, data)
    }

    pub(super) fn get_typed<T: Copy>(device: &Device, set: &Guid, id: u32) -> Result<T> {
        KsPropertySet::open(device)?.get_typed(set, id)
    }

    pub(super) fn set_typed<T: Copy>(device: &Device, set: &Guid, id: u32, value: T) -> Result<()> {
        KsPropertySet::open(device)?.set_typed(set, id, value)
    }
}

#[cfg(not(target_os = "windows"))]
mod imp {
    use super::*;
    use uvcctl_core::error::{Error, ErrorCode};

    fn not_implemented<T>() -> Result<T> {
        Err(Error::new(
            ErrorCode::NotImplemented,
            "vendor properties require the Windows backend",
        ))
    }

    pub(super) fn query_support(_: &Device, _: &Guid, _: u32) -> Result<u32> {
        not_implemented()
    }

    pub(super) fn get(_: &Device, _: &Guid, _: u32) -> Result<Vec<u8>> {
        not_implemented()
    }

    pub(super) fn set(_: &Device, _: &Guid, _: u32, _: &[u8]) -> Result<()> {
        not_implemented()
    }

    pub(super) fn get_typed<T: Copy>(_: &Device, _: &Guid, _: u32) -> Result<T> {
        not_implemented()
    }

    pub(super) fn set_typed<T: Copy>(_: &Device, _: &Guid, _: u32, _: T) -> Result<()> {
        not_implemented()
    }
}

/// Support bitfield for `(property_set, property_id)`; missing
/// [`SUPPORT_GET`]/[`SUPPORT_SET`] bits are a valid non-error answer.
pub fn query_vendor_property_support(device: &Device, set: &Guid, id: u32) -> Result<u32> {
    imp::query_support(device, set, id)
}

/// Read the raw bytes of a vendor property.
pub fn get_vendor_property(device: &Device, set: &Guid, id: u32) -> Result<Vec<u8>> {
    imp::get(device, set, id)
}

/// Write raw bytes to a vendor property.
pub fn set_vendor_property(device: &Device, set: &Guid, id: u32, data: &[u8]) -> Result<()> {
    imp::set(device, set, id, data)
}

/// Typed read; fails with `InvalidValue` on a size mismatch.
pub fn get_vendor_property_typed<T: Copy>(device: &Device, set: &Guid, id: u32) -> Result<T> {
    imp::get_typed(device, set, id)
}

/// Typed write of exactly `size_of::<T>()` bytes.
pub fn set_vendor_property_typed<T: Copy>(
    device: &Device,
    set: &Guid,
    id: u32,
    value: T,
) -> Result<()> {
    imp::set_typed(device, set, id, value)
}

pub mod logitech {
    //! Logitech vendor extensions (RightLight, face tracking, ...).

    use super::*;

    /// Logitech vendor property-set GUID.
    pub const PROPERTY_SET: Guid = Guid::new(
        0x4ACD1B2A,
        0x7F45,
        0x4B29,
        [0x8E, 0x9C, 0x17, 0x4B, 0x0E, 0x92, 0x5D, 0xB1],
    );

    /// Property ids inside [`PROPERTY_SET`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(u32)]
    pub enum LogitechProperty {
        RightLight = 1,
        RightSound = 2,
        FaceTracking = 3,
        LedIndicator = 4,
        ProcessorUsage = 5,
        RawDataBits = 6,
        FocusAssist = 7,
        VideoStandard = 8,
        DigitalZoomRoi = 9,
        TiltPan = 10,
    }

    impl LogitechProperty {
        pub const ALL: [LogitechProperty; 10] = [
            LogitechProperty::RightLight,
            LogitechProperty::RightSound,
            LogitechProperty::FaceTracking,
            LogitechProperty::LedIndicator,
            LogitechProperty::ProcessorUsage,
            LogitechProperty::RawDataBits,
            LogitechProperty::FocusAssist,
            LogitechProperty::VideoStandard,
            LogitechProperty::DigitalZoomRoi,
            LogitechProperty::TiltPan,
        ];

        pub fn name(self) -> &'static str {
            match self {
                LogitechProperty::RightLight => "RightLight",
                LogitechProperty::RightSound => "RightSound",
                LogitechProperty::FaceTracking => "FaceTracking",
                LogitechProperty::LedIndicator => "LedIndicator",
                LogitechProperty::ProcessorUsage => "ProcessorUsage",
                LogitechProperty::RawDataBits => "RawDataBits",
                LogitechProperty::FocusAssist => "FocusAssist",
                LogitechProperty::VideoStandard => "VideoStandard",
                LogitechProperty::DigitalZoomRoi => "DigitalZoomRoi",
                LogitechProperty::TiltPan => "TiltPan",
            }
        }

        pub fn from_id(id: u32) -> Option<Self> {
            (1..=10)
                .contains(&id)
                .then(|| Self::ALL[(id - 1) as usize])
        }
    }

    pub fn get_logitech_property(device: &Device, prop: LogitechProperty) -> Result<Vec<u8>> {
        get_vendor_property(device, &PROPERTY_SET, prop as u32)
    }

    pub fn set_logitech_property(
        device: &Device,
        prop: LogitechProperty,
        data: &[u8],
    ) -> Result<()> {
        set_vendor_property(device, &PROPERTY_SET, prop as u32, data)
    }

    pub fn get_logitech_property_typed<T: Copy>(
        device: &Device,
        prop: LogitechProperty,
    ) -> Result<T> {
        get_vendor_property_typed(device, &PROPERTY_SET, prop as u32)
    }

    pub fn set_logitech_property_typed<T: Copy>(
        device: &Device,
        prop: LogitechProperty,
        value: T,
    ) -> Result<()> {
        set_vendor_property_typed(device, &PROPERTY_SET, prop as u32, value)
    }

    /// Whether the device answers a RightLight support query with a
    /// usable get or set capability. Errors read as "not supported".
    pub fn supports_logitech_properties(device: &Device) -> Result<bool> {
        match query_vendor_property_support(
            device,
            &PROPERTY_SET,
            LogitechProperty::RightLight as u32,
        ) {
            Ok(flags) => Ok(flags & (SUPPORT_GET | SUPPORT_SET) != 0),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logitech::LogitechProperty;

    #[test]
    fn logitech_ids_round_trip() {
        for prop in LogitechProperty::ALL {
            assert_eq!(LogitechProperty::from_id(prop as u32), Some(prop));
        }
        assert_eq!(LogitechProperty::from_id(0), None);
        assert_eq!(LogitechProperty::from_id(11), None);
    }

    #[test]
    fn logitech_guid_text_round_trips() {
        let text = logitech::PROPERTY_SET.to_string();
        let parsed: Guid = text.parse().unwrap();
        assert_eq!(parsed, logitech::PROPERTY_SET);
    }

    #[cfg(not(target_os = "windows"))]
    mod stub {
        use super::*;
        use uvcctl_core::error::ErrorCode;

        #[test]
        fn vendor_ops_report_not_implemented() {
            let dev = Device::new("Cam", "path");
            let set = logitech::PROPERTY_SET;
            assert_eq!(
                query_vendor_property_support(&dev, &set, 1).unwrap_err().code(),
                ErrorCode::NotImplemented
            );
            assert_eq!(
                get_vendor_property(&dev, &set, 1).unwrap_err().code(),
                ErrorCode::NotImplemented
            );
            assert_eq!(
                set_vendor_property(&dev, &set, 1, &[0u8; 4]).unwrap_err().code(),
                ErrorCode::NotImplemented
            );
        }

        #[test]
        fn logitech_support_probe_reads_errors_as_unsupported() {
            let dev = Device::new("Cam", "path");
            assert_eq!(logitech::supports_logitech_properties(&dev).unwrap(), false);
        }
    }
}
