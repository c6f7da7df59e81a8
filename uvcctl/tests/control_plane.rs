//! End-to-end exercises of the public surface that do not need a
//! physical camera.

use uvcctl::prelude::*;
use uvcctl::{
    diagnostics, open_camera, open_camera_by_path, CamProp, ErrorCode, Guid, PropRange, VidProp,
};

#[test]
fn enumeration_is_a_list_not_an_error() {
    // Zero cameras is success with an empty list.
    let devices = list_devices().unwrap();
    for device in &devices {
        assert!(device.is_valid());
    }
}

#[test]
fn open_by_bogus_path_is_device_not_found() {
    let err = open_camera_by_path("\\\\?\\usb#vid_ffff&pid_ffff#nonexistent").unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeviceNotFound);
}

#[test]
fn open_invalid_record_is_invalid_argument() {
    let err = open_camera(&Device::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[test]
fn property_name_round_trips_are_stable() {
    for prop in CamProp::ALL {
        assert_eq!(CamProp::from_name(prop.name()), Some(prop));
    }
    for prop in VidProp::ALL {
        assert_eq!(VidProp::from_name(prop.name()), Some(prop));
    }
    for mode in [CamMode::Auto, CamMode::Manual] {
        assert_eq!(CamMode::from_name(mode.name()), Some(mode));
    }
}

#[test]
fn clamped_values_satisfy_the_range() {
    let range = PropRange {
        min: -64,
        max: 64,
        step: 8,
        default_val: 0,
        default_mode: CamMode::Auto,
    };
    for value in [-200, -65, -64, -63, 0, 3, 4, 63, 64, 200] {
        assert!(range.is_valid(range.clamp(value)));
    }
}

#[test]
fn guid_text_forms_agree() {
    let braced: Guid = "{0F45D1A3-0AB3-4F12-90D5-7A3C5B7E6F01}".parse().unwrap();
    let bare: Guid = "0F45D1A30AB34F1290D57A3C5B7E6F01".parse().unwrap();
    assert_eq!(braced, bare);
}

#[test]
fn statistics_reflect_recorded_outcomes() {
    diagnostics::record_operation(ErrorCode::Success);
    diagnostics::record_operation(ErrorCode::DeviceBusy);
    let report = diagnostics::error_statistics();
    assert!(report.contains("Total Operations:"));
    assert!(report.contains("DeviceBusy"));
}

#[cfg(not(target_os = "windows"))]
mod stub_only {
    use super::*;
    use uvcctl::device_capabilities;

    #[test]
    fn capability_snapshot_of_absent_device() {
        let caps = device_capabilities(&Device::new("Test Camera", "\\\\?\\usb#test")).unwrap();
        assert!(!caps.accessible);
        assert!(caps.supported_camera_properties().is_empty());
        assert!(caps.supported_video_properties().is_empty());
    }

    #[test]
    fn vendor_path_reports_not_implemented() {
        let device = Device::new("Test Camera", "\\\\?\\usb#test");
        let set = uvcctl::vendor::logitech::PROPERTY_SET;
        let err = uvcctl::vendor::get_vendor_property(&device, &set, 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotImplemented);
    }
}
