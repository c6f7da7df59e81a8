//! COM apartment lifecycle.

use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

use uvcctl_core::error::Result;

use crate::decode::system_error;

/// Per-thread COM apartment token.
///
/// Initialization is idempotent per thread (COM reference-counts it).
/// A thread that already runs a different apartment model is left
/// untouched: the guard observes `RPC_E_CHANGED_MODE`, records that it
/// does not own the apartment, and skips `CoUninitialize` on drop.
#[derive(Debug)]
pub struct ApartmentGuard {
    owns: bool,
}

impl ApartmentGuard {
    pub fn new() -> Result<Self> {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        if hr.is_ok() {
            return Ok(Self { owns: true });
        }
        if hr == RPC_E_CHANGED_MODE {
            return Ok(Self { owns: false });
        }
        Err(system_error(hr, "CoInitializeEx"))
    }
}

impl Drop for ApartmentGuard {
    fn drop(&mut self) {
        if self.owns {
            unsafe { CoUninitialize() };
        }
    }
}
