//! Keyed cache of live device connections.
//!
//! Opening a DirectShow filter costs tens of milliseconds; the pool
//! amortizes it across camera handles. Entries are validity-checked on
//! every acquisition and replaced when stale.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use uvcctl_core::error::Result;
use uvcctl_core::logging::log_debug;
use uvcctl_core::traits::DeviceControl;
use uvcctl_core::types::Device;

use crate::platform::platform;

/// Cache key: device path when present, else the name, folded to
/// ASCII lowercase to match device identity semantics.
fn cache_key(device: &Device) -> String {
    device.id().to_ascii_lowercase()
}

#[derive(Default)]
pub struct ConnectionPool {
    entries: Mutex<HashMap<String, Arc<dyn DeviceControl>>>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self
            .entries
            .lock()
            .map(|m| m.len())
            .unwrap_or_else(|e| e.into_inner().len());
        f.debug_struct("ConnectionPool").field("entries", &len).finish()
    }
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached connection for the device, opening one on a miss or when
    /// the cached entry went invalid. The pool keeps shared ownership;
    /// the entry stays alive until [`release`](Self::release) or
    /// [`clear`](Self::clear).
    pub fn acquire(&self, device: &Device) -> Result<Arc<dyn DeviceControl>> {
        let key = cache_key(device);

        {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(conn) = entries.get(&key) {
                if conn.is_valid() {
                    return Ok(conn.clone());
                }
            }
        }

        // Opening blocks on the host stack; the map lock is not held
        // across it. A racing open of the same device wins by
        // last-insert, which is harmless.
        let conn = platform().create_connection(device)?;
        log_debug(&format!("pooled new connection for {}", device.id()));

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, conn.clone());
        Ok(conn)
    }

    /// Evict the entry for one device.
    pub fn release(&self, device: &Device) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&cache_key(device));
    }

    /// Evict everything. Must run before process teardown so host
    /// references are not released during shutdown.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|m| m.len())
            .unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide pool used by [`crate::Camera`].
pub fn global_pool() -> &'static ConnectionPool {
    static POOL: OnceLock<ConnectionPool> = OnceLock::new();
    POOL.get_or_init(ConnectionPool::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_prefers_path_and_folds_case() {
        let dev = Device::new("My Camera", "\\\\?\\USB#VID_046D");
        assert_eq!(cache_key(&dev), "\\\\?\\usb#vid_046d");
        let dev = Device::new("My Camera", "");
        assert_eq!(cache_key(&dev), "my camera");
    }

    #[test]
    fn equal_devices_share_a_key() {
        let a = Device::new("name a", "\\\\?\\USB#VID_046D");
        let b = Device::new("name b", "\\\\?\\usb#vid_046d");
        assert_eq!(a, b);
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn acquire_fails_cleanly_without_backend() {
        let pool = ConnectionPool::new();
        let err = pool.acquire(&Device::new("Cam", "path")).unwrap_err();
        assert_eq!(err.code(), uvcctl_core::error::ErrorCode::NotImplemented);
        assert!(pool.is_empty());
    }

    #[test]
    fn release_and_clear_are_idempotent() {
        let pool = ConnectionPool::new();
        let dev = Device::new("Cam", "path");
        pool.release(&dev);
        pool.release(&dev);
        pool.clear();
        pool.clear();
        assert!(pool.is_empty());
    }
}
