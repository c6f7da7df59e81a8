//! Per-device connection holding the filter and both control
//! interfaces.

use std::sync::atomic::{AtomicBool, Ordering};

use windows::core::Interface;
use windows::Win32::Media::DirectShow::{IAMCameraControl, IAMVideoProcAmp, IBaseFilter};

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::logging::log_debug;
use uvcctl_core::props::{CamProp, VidProp};
use uvcctl_core::traits::DeviceControl;
use uvcctl_core::types::{CamMode, Device, PropRange, PropSetting};

use crate::com::ApartmentGuard;
use crate::decode::map_windows_error;
use crate::enumerate;

/// Open handle to one device.
///
/// Field order fixes the teardown sequence: control interfaces are
/// released before the filter, the filter before the apartment token.
pub struct DshowConnection {
    cam_ctrl: Option<IAMCameraControl>,
    vid_proc: Option<IAMVideoProcAmp>,
    _filter: IBaseFilter,
    _apartment: ApartmentGuard,
    device: Device,
    valid: AtomicBool,
}

// The COM interfaces are apartment-bound in principle, but the pool
// hands connections across threads exactly as the host proxies allow
// for these control interfaces. Same pattern as the streams in the
// other backends.
unsafe impl Send for DshowConnection {}
unsafe impl Sync for DshowConnection {}

impl std::fmt::Debug for DshowConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DshowConnection")
            .field("device", &self.device.id())
            .field("valid", &self.valid.load(Ordering::Relaxed))
            .field("camera_control", &self.cam_ctrl.is_some())
            .field("video_proc_amp", &self.vid_proc.is_some())
            .finish()
    }
}

impl DshowConnection {
    /// Bind the device and query both control interfaces. A failed
    /// construction releases everything it acquired; callers never see
    /// partial state.
    pub fn open(device: &Device) -> Result<Self> {
        let apartment = ApartmentGuard::new()?;
        let filter = enumerate::bind_filter(device)?;

        let cam_ctrl = filter.cast::<IAMCameraControl>().ok();
        let vid_proc = filter.cast::<IAMVideoProcAmp>().ok();
        if cam_ctrl.is_none() && vid_proc.is_none() {
            return Err(Error::new(
                ErrorCode::ConnectionFailed,
                format!("{device}: filter exposes no control interfaces"),
            ));
        }

        log_debug(&format!("opened connection to {device}"));

        Ok(Self {
            cam_ctrl,
            vid_proc,
            _filter: filter,
            _apartment: apartment,
            device: device.clone(),
            valid: AtomicBool::new(true),
        })
    }

    fn check_valid(&self) -> Result<()> {
        if self.valid.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::new(
                ErrorCode::DeviceNotFound,
                format!("{}: connection is no longer valid", self.device),
            ))
        }
    }

    /// Open -> Invalid on errors that mean the device is gone; the
    /// transition is one-way.
    fn note_result<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if matches!(
                err.code(),
                ErrorCode::DeviceNotFound | ErrorCode::ConnectionFailed
            ) {
                self.valid.store(false, Ordering::Release);
            }
        }
        result
    }

    fn cam_ctrl(&self) -> Result<&IAMCameraControl> {
        self.cam_ctrl.as_ref().ok_or_else(|| {
            Error::new(
                ErrorCode::PropertyNotSupported,
                "camera control interface not available",
            )
        })
    }

    fn vid_proc(&self) -> Result<&IAMVideoProcAmp> {
        self.vid_proc.as_ref().ok_or_else(|| {
            Error::new(
                ErrorCode::PropertyNotSupported,
                "video processing interface not available",
            )
        })
    }

    /// Reject a manual write the device would have to guess at: out of
    /// range or unaligned values fail with `InvalidValue` and leave the
    /// device untouched.
    fn validate_manual(&self, setting: PropSetting, range: Result<PropRange>) -> Result<()> {
        if setting.mode != CamMode::Manual {
            return Ok(());
        }
        // A property without a readable range cannot be validated;
        // leave the verdict to the device.
        let Ok(range) = range else { return Ok(()) };
        if range.is_valid(setting.value) {
            Ok(())
        } else {
            Err(Error::new(
                ErrorCode::InvalidValue,
                format!(
                    "value {} outside [{}, {}] step {}",
                    setting.value, range.min, range.max, range.step
                ),
            ))
        }
    }

    fn camera_get_inner(&self, prop: CamProp) -> Result<PropSetting> {
        let ctrl = self.cam_ctrl()?;
        let mut value = 0i32;
        let mut flags = 0i32;
        unsafe { ctrl.Get(prop.selector(), &mut value, &mut flags) }
            .map_err(|e| map_windows_error(e, &format!("IAMCameraControl::Get({prop})")))?;
        Ok(PropSetting::new(value, CamMode::from_flags(flags)))
    }

    fn camera_set_inner(&self, prop: CamProp, setting: PropSetting) -> Result<()> {
        let ctrl = self.cam_ctrl()?;
        self.validate_manual(setting, self.camera_range_inner(prop))?;
        unsafe { ctrl.Set(prop.selector(), setting.value, setting.mode.to_flags()) }
            .map_err(|e| map_windows_error(e, &format!("IAMCameraControl::Set({prop})")))
    }

    fn camera_range_inner(&self, prop: CamProp) -> Result<PropRange> {
        let ctrl = self.cam_ctrl()?;
        let (mut min, mut max, mut step, mut default, mut flags) = (0i32, 0i32, 0i32, 0i32, 0i32);
        unsafe {
            ctrl.GetRange(
                prop.selector(),
                &mut min,
                &mut max,
                &mut step,
                &mut default,
                &mut flags,
            )
        }
        .map_err(|e| map_windows_error(e, &format!("IAMCameraControl::GetRange({prop})")))?;
        Ok(PropRange {
            min,
            max,
            step,
            default_val: default,
            default_mode: CamMode::from_flags(flags),
        })
    }

    fn video_get_inner(&self, prop: VidProp) -> Result<PropSetting> {
        let proc = self.vid_proc()?;
        let mut value = 0i32;
        let mut flags = 0i32;
        unsafe { proc.Get(prop.selector(), &mut value, &mut flags) }
            .map_err(|e| map_windows_error(e, &format!("IAMVideoProcAmp::Get({prop})")))?;
        Ok(PropSetting::new(value, CamMode::from_flags(flags)))
    }

    fn video_set_inner(&self, prop: VidProp, setting: PropSetting) -> Result<()> {
        let proc = self.vid_proc()?;
        self.validate_manual(setting, self.video_range_inner(prop))?;
        unsafe { proc.Set(prop.selector(), setting.value, setting.mode.to_flags()) }
            .map_err(|e| map_windows_error(e, &format!("IAMVideoProcAmp::Set({prop})")))
    }

    fn video_range_inner(&self, prop: VidProp) -> Result<PropRange> {
        let proc = self.vid_proc()?;
        let (mut min, mut max, mut step, mut default, mut flags) = (0i32, 0i32, 0i32, 0i32, 0i32);
        unsafe {
            proc.GetRange(
                prop.selector(),
                &mut min,
                &mut max,
                &mut step,
                &mut default,
                &mut flags,
            )
        }
        .map_err(|e| map_windows_error(e, &format!("IAMVideoProcAmp::GetRange({prop})")))?;
        Ok(PropRange {
            min,
            max,
            step,
            default_val: default,
            default_mode: CamMode::from_flags(flags),
        })
    }
}

impl DeviceControl for DshowConnection {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn camera_get(&self, prop: CamProp) -> Result<PropSetting> {
        self.check_valid()?;
        let result = self.camera_get_inner(prop);
        self.note_result(result)
    }

    fn camera_set(&self, prop: CamProp, setting: PropSetting) -> Result<()> {
        self.check_valid()?;
        let result = self.camera_set_inner(prop, setting);
        self.note_result(result)
    }

    fn camera_range(&self, prop: CamProp) -> Result<PropRange> {
        self.check_valid()?;
        let result = self.camera_range_inner(prop);
        self.note_result(result)
    }

    fn video_get(&self, prop: VidProp) -> Result<PropSetting> {
        self.check_valid()?;
        let result = self.video_get_inner(prop);
        self.note_result(result)
    }

    fn video_set(&self, prop: VidProp, setting: PropSetting) -> Result<()> {
        self.check_valid()?;
        let result = self.video_set_inner(prop, setting);
        self.note_result(result)
    }

    fn video_range(&self, prop: VidProp) -> Result<PropRange> {
        self.check_valid()?;
        let result = self.video_range_inner(prop);
        self.note_result(result)
    }
}
