//! Closed property enumerations and the selector table.
//!
//! One table per domain is the single source of truth for the
//! DirectShow property selector and the canonical string name; enum
//! round-trips and the backend mapping both read from it.

use std::fmt;

use serde::Serialize;

/// Physical camera controls (IAMCameraControl domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CamProp {
    Pan,
    Tilt,
    Roll,
    Zoom,
    Exposure,
    Iris,
    Focus,
    ScanMode,
    Privacy,
    PanRelative,
    TiltRelative,
    RollRelative,
    ZoomRelative,
    ExposureRelative,
    IrisRelative,
    FocusRelative,
    PanTilt,
    PanTiltRelative,
    FocusSimple,
    DigitalZoom,
    DigitalZoomRelative,
    BacklightCompensation,
    Lamp,
}

/// Image-processing controls (IAMVideoProcAmp domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum VidProp {
    Brightness,
    Contrast,
    Hue,
    Saturation,
    Sharpness,
    Gamma,
    ColorEnable,
    WhiteBalance,
    BacklightCompensation,
    Gain,
}

/// One row of a property table.
#[derive(Debug, Clone, Copy)]
pub struct PropEntry<P: 'static> {
    pub prop: P,
    /// Host-domain selector (CameraControl_* / VideoProcAmp_* value).
    pub selector: i32,
    /// Canonical name, also used for parsing.
    pub name: &'static str,
}

pub const CAM_PROP_TABLE: [PropEntry<CamProp>; 23] = [
    PropEntry { prop: CamProp::Pan, selector: 0, name: "Pan" },
    PropEntry { prop: CamProp::Tilt, selector: 1, name: "Tilt" },
    PropEntry { prop: CamProp::Roll, selector: 2, name: "Roll" },
    PropEntry { prop: CamProp::Zoom, selector: 3, name: "Zoom" },
    PropEntry { prop: CamProp::Exposure, selector: 4, name: "Exposure" },
    PropEntry { prop: CamProp::Iris, selector: 5, name: "Iris" },
    PropEntry { prop: CamProp::Focus, selector: 6, name: "Focus" },
    PropEntry { prop: CamProp::ScanMode, selector: 7, name: "ScanMode" },
    PropEntry { prop: CamProp::Privacy, selector: 8, name: "Privacy" },
    PropEntry { prop: CamProp::PanRelative, selector: 9, name: "PanRelative" },
    PropEntry { prop: CamProp::TiltRelative, selector: 10, name: "TiltRelative" },
    PropEntry { prop: CamProp::RollRelative, selector: 11, name: "RollRelative" },
    PropEntry { prop: CamProp::ZoomRelative, selector: 12, name: "ZoomRelative" },
    PropEntry { prop: CamProp::ExposureRelative, selector: 13, name: "ExposureRelative" },
    PropEntry { prop: CamProp::IrisRelative, selector: 14, name: "IrisRelative" },
    PropEntry { prop: CamProp::FocusRelative, selector: 15, name: "FocusRelative" },
    PropEntry { prop: CamProp::PanTilt, selector: 16, name: "PanTilt" },
    PropEntry { prop: CamProp::PanTiltRelative, selector: 17, name: "PanTiltRelative" },
    PropEntry { prop: CamProp::FocusSimple, selector: 18, name: "FocusSimple" },
    PropEntry { prop: CamProp::DigitalZoom, selector: 19, name: "DigitalZoom" },
    PropEntry { prop: CamProp::DigitalZoomRelative, selector: 20, name: "DigitalZoomRelative" },
    PropEntry { prop: CamProp::BacklightCompensation, selector: 21, name: "BacklightCompensation" },
    PropEntry { prop: CamProp::Lamp, selector: 22, name: "Lamp" },
];

pub const VID_PROP_TABLE: [PropEntry<VidProp>; 10] = [
    PropEntry { prop: VidProp::Brightness, selector: 0, name: "Brightness" },
    PropEntry { prop: VidProp::Contrast, selector: 1, name: "Contrast" },
    PropEntry { prop: VidProp::Hue, selector: 2, name: "Hue" },
    PropEntry { prop: VidProp::Saturation, selector: 3, name: "Saturation" },
    PropEntry { prop: VidProp::Sharpness, selector: 4, name: "Sharpness" },
    PropEntry { prop: VidProp::Gamma, selector: 5, name: "Gamma" },
    PropEntry { prop: VidProp::ColorEnable, selector: 6, name: "ColorEnable" },
    PropEntry { prop: VidProp::WhiteBalance, selector: 7, name: "WhiteBalance" },
    PropEntry { prop: VidProp::BacklightCompensation, selector: 8, name: "BacklightCompensation" },
    PropEntry { prop: VidProp::Gain, selector: 9, name: "Gain" },
];

impl CamProp {
    pub const ALL: [CamProp; 23] = {
        let mut all = [CamProp::Pan; 23];
        let mut i = 0;
        while i < CAM_PROP_TABLE.len() {
            all[i] = CAM_PROP_TABLE[i].prop;
            i += 1;
        }
        all
    };

    fn entry(self) -> &'static PropEntry<CamProp> {
        // Table rows are ordered by declaration, so the discriminant
        // doubles as the row index.
        &CAM_PROP_TABLE[self as usize]
    }

    /// Host-domain selector; total over the enumeration.
    pub fn selector(self) -> i32 {
        self.entry().selector
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CAM_PROP_TABLE
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.prop)
    }

    /// Reverse of the C-surface integer encoding (declaration order).
    pub fn from_index(index: u32) -> Option<Self> {
        CAM_PROP_TABLE.get(index as usize).map(|e| e.prop)
    }
}

impl VidProp {
    pub const ALL: [VidProp; 10] = {
        let mut all = [VidProp::Brightness; 10];
        let mut i = 0;
        while i < VID_PROP_TABLE.len() {
            all[i] = VID_PROP_TABLE[i].prop;
            i += 1;
        }
        all
    };

    fn entry(self) -> &'static PropEntry<VidProp> {
        &VID_PROP_TABLE[self as usize]
    }

    pub fn selector(self) -> i32 {
        self.entry().selector
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        VID_PROP_TABLE
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.prop)
    }

    pub fn from_index(index: u32) -> Option<Self> {
        VID_PROP_TABLE.get(index as usize).map(|e| e.prop)
    }
}

impl fmt::Display for CamProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl fmt::Display for VidProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_selectors_match_directshow_values() {
        assert_eq!(CamProp::Pan.selector(), 0);
        assert_eq!(CamProp::Zoom.selector(), 3);
        assert_eq!(CamProp::Focus.selector(), 6);
        assert_eq!(CamProp::Lamp.selector(), 22);
    }

    #[test]
    fn video_selectors_match_directshow_values() {
        assert_eq!(VidProp::Brightness.selector(), 0);
        assert_eq!(VidProp::WhiteBalance.selector(), 7);
        assert_eq!(VidProp::Gain.selector(), 9);
    }

    #[test]
    fn selector_mapping_is_total_and_dense() {
        for (i, prop) in CamProp::ALL.iter().enumerate() {
            assert_eq!(prop.selector(), i as i32);
        }
        for (i, prop) in VidProp::ALL.iter().enumerate() {
            assert_eq!(prop.selector(), i as i32);
        }
    }

    #[test]
    fn name_round_trip() {
        for prop in CamProp::ALL {
            assert_eq!(CamProp::from_name(prop.name()), Some(prop));
        }
        for prop in VidProp::ALL {
            assert_eq!(VidProp::from_name(prop.name()), Some(prop));
        }
    }

    #[test]
    fn name_parsing_is_case_insensitive() {
        assert_eq!(CamProp::from_name("pan"), Some(CamProp::Pan));
        assert_eq!(CamProp::from_name("PANTILT"), Some(CamProp::PanTilt));
        assert_eq!(VidProp::from_name("whitebalance"), Some(VidProp::WhiteBalance));
        assert_eq!(CamProp::from_name("NoSuchProp"), None);
    }

    #[test]
    fn index_round_trip() {
        for (i, prop) in CamProp::ALL.iter().enumerate() {
            assert_eq!(CamProp::from_index(i as u32), Some(*prop));
        }
        assert_eq!(CamProp::from_index(23), None);
        for (i, prop) in VidProp::ALL.iter().enumerate() {
            assert_eq!(VidProp::from_index(i as u32), Some(*prop));
        }
        assert_eq!(VidProp::from_index(10), None);
    }
}
