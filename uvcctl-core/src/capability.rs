//! Point-in-time capability snapshots.
//!
//! The scanning itself lives in the facade crate (it goes through a
//! short-lived camera handle); this module is the data model.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::props::{CamProp, VidProp};
use crate::types::{Device, PropRange, PropSetting};

/// Capability of one property on one device at scan time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PropertyCapability {
    pub supported: bool,
    pub range: PropRange,
    /// Current setting at scan time; falls back to the range default
    /// when the device would not answer the read.
    pub current: PropSetting,
}

impl PropertyCapability {
    pub fn new(range: PropRange, current: PropSetting) -> Self {
        Self {
            supported: true,
            range,
            current,
        }
    }
}

/// Snapshot of every known property's capability on one device.
///
/// An entry is present iff the device returned a valid range for that
/// property at scan time.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceCapabilities {
    pub device: Device,
    pub accessible: bool,
    pub camera: BTreeMap<CamProp, PropertyCapability>,
    pub video: BTreeMap<VidProp, PropertyCapability>,
}

impl DeviceCapabilities {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            accessible: false,
            camera: BTreeMap::new(),
            video: BTreeMap::new(),
        }
    }

    pub fn camera_capability(&self, prop: CamProp) -> Option<&PropertyCapability> {
        self.camera.get(&prop)
    }

    pub fn video_capability(&self, prop: VidProp) -> Option<&PropertyCapability> {
        self.video.get(&prop)
    }

    pub fn supports_camera_property(&self, prop: CamProp) -> bool {
        self.camera.get(&prop).map_or(false, |c| c.supported)
    }

    pub fn supports_video_property(&self, prop: VidProp) -> bool {
        self.video.get(&prop).map_or(false, |c| c.supported)
    }

    pub fn supported_camera_properties(&self) -> Vec<CamProp> {
        self.camera
            .iter()
            .filter(|(_, c)| c.supported)
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn supported_video_properties(&self) -> Vec<VidProp> {
        self.video
            .iter()
            .filter(|(_, c)| c.supported)
            .map(|(p, _)| *p)
            .collect()
    }

    /// Drop all entries ahead of a rescan.
    pub fn reset(&mut self) {
        self.accessible = false;
        self.camera.clear();
        self.video.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CamMode;

    fn capability() -> PropertyCapability {
        let range = PropRange {
            min: 0,
            max: 255,
            step: 1,
            default_val: 128,
            default_mode: CamMode::Auto,
        };
        PropertyCapability::new(range, range.default_setting())
    }

    #[test]
    fn absent_entries_read_as_unsupported() {
        let caps = DeviceCapabilities::new(Device::new("Cam", "path"));
        assert!(!caps.supports_camera_property(CamProp::Pan));
        assert!(!caps.supports_video_property(VidProp::Brightness));
        assert!(caps.camera_capability(CamProp::Zoom).is_none());
    }

    #[test]
    fn supported_lists_only_present_entries() {
        let mut caps = DeviceCapabilities::new(Device::new("Cam", "path"));
        caps.camera.insert(CamProp::Zoom, capability());
        caps.camera.insert(CamProp::Focus, capability());
        caps.video.insert(VidProp::Brightness, capability());

        let cam = caps.supported_camera_properties();
        assert_eq!(cam.len(), 2);
        assert!(cam.contains(&CamProp::Zoom));
        assert!(cam.contains(&CamProp::Focus));
        assert_eq!(caps.supported_video_properties(), vec![VidProp::Brightness]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut caps = DeviceCapabilities::new(Device::new("Cam", "path"));
        caps.accessible = true;
        caps.video.insert(VidProp::Gain, capability());
        caps.reset();
        assert!(!caps.accessible);
        assert!(caps.video.is_empty());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut caps = DeviceCapabilities::new(Device::new("Cam", "path"));
        caps.accessible = true;
        caps.video.insert(VidProp::Brightness, capability());

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["accessible"], true);
        assert_eq!(json["video"]["Brightness"]["supported"], true);
        assert_eq!(json["video"]["Brightness"]["range"]["max"], 255);
    }
}
