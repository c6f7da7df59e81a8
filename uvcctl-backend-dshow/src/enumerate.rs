//! DirectShow device enumeration and moniker-to-filter binding.

use std::ffi::c_void;

use windows::core::{w, Interface, PCWSTR};
use windows::Win32::Media::DirectShow::{
    IBaseFilter, ICreateDevEnum, CLSID_SystemDeviceEnum, CLSID_VideoInputDeviceCategory,
};
use windows::Win32::System::Com::StructuredStorage::IPropertyBag;
use windows::Win32::System::Com::{
    CoCreateInstance, CoTaskMemFree, IEnumMoniker, IMoniker, CLSCTX_INPROC_SERVER,
};
use windows::Win32::System::Variant::{VariantClear, VARIANT, VT_BSTR};

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::logging::{log_info, log_warning};
use uvcctl_core::types::Device;

use crate::com::ApartmentGuard;
use crate::decode::map_windows_error;

fn create_dev_enum() -> Result<ICreateDevEnum> {
    unsafe { CoCreateInstance(&CLSID_SystemDeviceEnum, None, CLSCTX_INPROC_SERVER) }
        .map_err(|e| map_windows_error(e, "CoCreateInstance(SystemDeviceEnum)"))
}

/// Class enumerator for video-input devices; `None` when the category
/// is empty (S_FALSE from the host).
fn enum_video_devices(dev_enum: &ICreateDevEnum) -> Result<Option<IEnumMoniker>> {
    let mut enum_moniker: Option<IEnumMoniker> = None;
    let hr = unsafe {
        dev_enum.CreateClassEnumerator(&CLSID_VideoInputDeviceCategory, &mut enum_moniker, 0)
    };
    if hr.is_err() {
        return Err(crate::decode::system_error(
            hr,
            "CreateClassEnumerator(VideoInputDeviceCategory)",
        ));
    }
    Ok(enum_moniker)
}

/// Reads one BSTR property out of a moniker's property bag.
unsafe fn read_prop_bstr(bag: &IPropertyBag, key: PCWSTR) -> String {
    let mut var = VARIANT::default();
    let mut result = String::new();

    if bag.Read(key, &mut var, None).is_ok() {
        let inner = &var.Anonymous.Anonymous;
        if inner.vt == VT_BSTR {
            result = inner.Anonymous.bstrVal.to_string();
        }
    }
    let _ = VariantClear(&mut var);
    result
}

unsafe fn read_friendly_name(moniker: &IMoniker) -> String {
    let mut bag: Option<IPropertyBag> = None;
    let hr = moniker.BindToStorage(
        None,
        None,
        &IPropertyBag::IID,
        &mut bag as *mut _ as *mut *mut c_void,
    );
    match (hr, bag) {
        (Ok(()), Some(bag)) => read_prop_bstr(&bag, w!("FriendlyName")),
        _ => String::new(),
    }
}

unsafe fn read_device_path(moniker: &IMoniker) -> String {
    let mut bag: Option<IPropertyBag> = None;
    let hr = moniker.BindToStorage(
        None,
        None,
        &IPropertyBag::IID,
        &mut bag as *mut _ as *mut *mut c_void,
    );
    if let (Ok(()), Some(bag)) = (hr, bag) {
        let path = read_prop_bstr(&bag, w!("DevicePath"));
        if !path.is_empty() {
            return path;
        }
    }

    // Some virtual cameras publish no DevicePath; the display name is
    // the next-most-stable identifier.
    match moniker.GetDisplayName(None, None) {
        Ok(display) if !display.is_null() => {
            let text = display.to_string().unwrap_or_default();
            CoTaskMemFree(Some(display.as_ptr() as *const c_void));
            text
        }
        _ => String::new(),
    }
}

fn for_each_moniker<T>(
    mut visit: impl FnMut(&IMoniker, String, String) -> Option<T>,
) -> Result<Option<T>> {
    let _com = ApartmentGuard::new()?;
    let dev_enum = create_dev_enum()?;
    let Some(enumerator) = enum_video_devices(&dev_enum)? else {
        return Ok(None);
    };

    loop {
        let mut slot: [Option<IMoniker>; 1] = [None];
        let mut fetched = 0u32;
        let hr = unsafe { enumerator.Next(&mut slot, Some(&mut fetched)) };
        if hr.is_err() || fetched == 0 {
            break;
        }
        let Some(moniker) = slot[0].take() else {
            break;
        };

        let name = unsafe { read_friendly_name(&moniker) };
        let path = unsafe { read_device_path(&moniker) };
        if let Some(out) = visit(&moniker, name, path) {
            return Ok(Some(out));
        }
    }

    Ok(None)
}

/// Enumerate currently-present video-input devices in host order.
pub fn list_devices() -> Result<Vec<Device>> {
    let mut devices = Vec::new();
    for_each_moniker(|_, name, path| {
        if !name.is_empty() || !path.is_empty() {
            devices.push(Device::new(name, path));
        } else {
            log_warning("skipping device with neither name nor path");
        }
        None::<()>
    })?;
    log_info(&format!("enumerated {} video devices", devices.len()));
    Ok(devices)
}

/// Appearance-in-enumeration check; a busy-but-present device counts
/// as connected.
pub fn is_device_connected(device: &Device) -> Result<bool> {
    let found = for_each_moniker(|_, name, path| device.matches(&name, &path).then_some(()))?;
    Ok(found.is_some())
}

/// Full device record for a path, or `DeviceNotFound`.
pub fn find_device_by_path(path: &str) -> Result<Device> {
    let probe = Device::new("", path);
    let found =
        for_each_moniker(|_, name, dev_path| {
            probe
                .matches(&name, &dev_path)
                .then_some(Device::new(name, dev_path))
        })?;
    found.ok_or_else(|| {
        Error::new(
            ErrorCode::DeviceNotFound,
            format!("no video device with path {path}"),
        )
    })
}

/// Resolve the device's moniker and bind it to a filter.
///
/// The caller must hold an apartment on this thread for the lifetime
/// of the returned filter.
pub fn bind_filter(device: &Device) -> Result<IBaseFilter> {
    let bound = for_each_moniker(|moniker, name, path| {
        if !device.matches(&name, &path) {
            return None;
        }
        let mut filter: Option<IBaseFilter> = None;
        let hr = unsafe {
            moniker.BindToObject(
                None,
                None,
                &IBaseFilter::IID,
                &mut filter as *mut _ as *mut *mut c_void,
            )
        };
        Some(match (hr, filter) {
            (Ok(()), Some(filter)) => Ok(filter),
            (Err(e), _) => Err(map_windows_error(e, "BindToObject(IBaseFilter)")),
            (Ok(()), None) => Err(Error::new(
                ErrorCode::ConnectionFailed,
                "BindToObject returned no filter",
            )),
        })
    })?;

    match bound {
        Some(result) => result,
        None => Err(Error::new(
            ErrorCode::DeviceNotFound,
            format!("device not found: {device}"),
        )),
    }
}

/// Used by diagnostics: can the DirectShow enumerator be created at all.
pub fn probe_host_stack() -> bool {
    let Ok(_com) = ApartmentGuard::new() else {
        return false;
    };
    create_dev_enum().is_ok()
}
