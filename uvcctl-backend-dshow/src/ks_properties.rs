//! IKsPropertySet bridge for vendor-defined properties.

use std::ffi::c_void;

use windows::core::{w, Interface, GUID};
use windows::Win32::Foundation::{FreeLibrary, HMODULE};
use windows::Win32::Media::DirectShow::{IBaseFilter, IKsPropertySet};
use windows::Win32::System::LibraryLoader::LoadLibraryW;

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::guid::Guid;
use uvcctl_core::logging::log_debug;
use uvcctl_core::types::Device;

use crate::com::ApartmentGuard;
use crate::decode::{map_windows_error, system_error};
use crate::enumerate;

/// Support-bitfield flags returned by [`KsPropertySet::query_support`]
/// (KSPROPERTY_SUPPORT_* values).
pub const SUPPORT_GET: u32 = 0x0001;
pub const SUPPORT_SET: u32 = 0x0002;

/// Pin on the kernel-streaming proxy module.
///
/// The IKsPropertySet vtables reachable through a capture filter live
/// in ksproxy.ax. The pin keeps the module mapped while any filter
/// reference might still call through it.
struct ModulePin(HMODULE);

impl ModulePin {
    fn acquire() -> Result<Self> {
        let module = unsafe { LoadLibraryW(w!("ksproxy.ax")) }
            .map_err(|e| system_error(e.code(), "LoadLibrary(ksproxy.ax)"))?;
        Ok(Self(module))
    }
}

impl Drop for ModulePin {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            unsafe {
                let _ = FreeLibrary(self.0);
            }
        }
    }
}

/// Vendor property access for one device.
///
/// Holds only the filter reference and the module pin; a fresh
/// `IKsPropertySet` reference is obtained for each operation and
/// dropped before returning. Field order is load-bearing: the filter
/// must be released before the module is unpinned (a reversed order
/// would tear the vtables out from under live references), and the
/// apartment goes down last.
pub struct KsPropertySet {
    filter: IBaseFilter,
    _module: ModulePin,
    _apartment: ApartmentGuard,
    device: Device,
}

unsafe impl Send for KsPropertySet {}

impl std::fmt::Debug for KsPropertySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KsPropertySet")
            .field("device", &self.device.id())
            .finish()
    }
}

fn to_host_guid(guid: &Guid) -> GUID {
    GUID::from_values(guid.data1, guid.data2, guid.data3, guid.data4)
}

impl KsPropertySet {
    /// Open the device filter, pin the proxy module, and verify the
    /// filter exposes the property-set capability. The verification
    /// reference is dropped before this returns.
    pub fn open(device: &Device) -> Result<Self> {
        let apartment = ApartmentGuard::new()?;
        let module = ModulePin::acquire()?;
        let filter = enumerate::bind_filter(device)?;

        // Capability check only; the reference is not retained.
        filter.cast::<IKsPropertySet>().map_err(|_| {
            Error::new(
                ErrorCode::PropertyNotSupported,
                format!("{device}: filter exposes no property-set interface"),
            )
        })?;

        log_debug(&format!("vendor property set opened for {device}"));

        Ok(Self {
            filter,
            _module: module,
            _apartment: apartment,
            device: device.clone(),
        })
    }

    /// Fresh property-set reference for one operation.
    fn property_set(&self) -> Result<IKsPropertySet> {
        self.filter.cast::<IKsPropertySet>().map_err(|_| {
            Error::new(
                ErrorCode::PropertyNotSupported,
                "property-set interface no longer available",
            )
        })
    }

    /// Support bitfield for `(property_set, property_id)`. Absence of
    /// [`SUPPORT_GET`]/[`SUPPORT_SET`] is a valid non-error result.
    pub fn query_support(&self, property_set: &Guid, property_id: u32) -> Result<u32> {
        let props = self.property_set()?;
        let guid = to_host_guid(property_set);
        let mut type_support = 0u32;
        unsafe { props.QuerySupported(&guid, property_id, &mut type_support) }.map_err(|e| {
            Error::new(
                ErrorCode::PropertyNotSupported,
                format!(
                    "property {property_set}/{property_id} not supported: {}",
                    crate::decode::decode_hresult(e.code())
                ),
            )
        })?;
        Ok(type_support)
    }

    /// Two-step exchange: size query first, then the payload. Returns
    /// exactly the bytes the host wrote, which may be fewer than the
    /// reported length.
    pub fn get_property(&self, property_set: &Guid, property_id: u32) -> Result<Vec<u8>> {
        let props = self.property_set()?;
        let guid = to_host_guid(property_set);

        let mut needed = 0u32;
        unsafe { props.Get(&guid, property_id, None, 0, None, 0, &mut needed) }
            .map_err(|e| map_windows_error(e, "IKsPropertySet::Get(size)"))?;
        if needed == 0 {
            return Err(Error::new(
                ErrorCode::PropertyNotSupported,
                format!("property {property_set}/{property_id} reports no data"),
            ));
        }

        let mut data = vec![0u8; needed as usize];
        let mut returned = 0u32;
        unsafe {
            props.Get(
                &guid,
                property_id,
                None,
                0,
                Some(data.as_mut_ptr() as *mut c_void),
                needed,
                &mut returned,
            )
        }
        .map_err(|e| map_windows_error(e, "IKsPropertySet::Get"))?;

        data.truncate(returned as usize);
        Ok(data)
    }

    /// Write the supplied bytes verbatim.
    pub fn set_property(&self, property_set: &Guid, property_id: u32, data: &[u8]) -> Result<()> {
        let props = self.property_set()?;
        let guid = to_host_guid(property_set);
        unsafe {
            props.Set(
                &guid,
                property_id,
                None,
                0,
                Some(data.as_ptr() as *const c_void),
                data.len() as u32,
            )
        }
        .map_err(|e| map_windows_error(e, "IKsPropertySet::Set"))
    }

    /// Typed read; `InvalidValue` unless the device returned exactly
    /// `size_of::<T>()` bytes.
    pub fn get_typed<T: Copy>(&self, property_set: &Guid, property_id: u32) -> Result<T> {
        let data = self.get_property(property_set, property_id)?;
        if data.len() != std::mem::size_of::<T>() {
            return Err(Error::new(
                ErrorCode::InvalidValue,
                format!(
                    "property data size mismatch: expected {} bytes, got {}",
                    std::mem::size_of::<T>(),
                    data.len()
                ),
            ));
        }
        Ok(unsafe { std::ptr::read_unaligned(data.as_ptr() as *const T) })
    }

    /// Typed write of exactly `size_of::<T>()` bytes.
    pub fn set_typed<T: Copy>(&self, property_set: &Guid, property_id: u32, value: T) -> Result<()> {
        let bytes = unsafe {
            std::slice::from_raw_parts(&value as *const T as *const u8, std::mem::size_of::<T>())
        };
        self.set_property(property_set, property_id, bytes)
    }
}
