//! Hot-plug monitoring.
//!
//! One dedicated watcher thread compares successive enumerations and
//! delivers `(added, device_path)` events serially to the single
//! registered observer. `unregister` stops new dispatch without
//! blocking on a callback that is already running.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use uvcctl_core::error::{Error, ErrorCode, Result};
use uvcctl_core::logging::{log_debug, log_error, log_info};
use uvcctl_core::types::Device;

use crate::platform::platform;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// `(added, device_path)` observer. Invocations never overlap; no
/// particular thread identity is guaranteed.
pub type DeviceChangeCallback = Box<dyn FnMut(bool, &str) + Send>;

type CallbackSlot = Arc<Mutex<Option<DeviceChangeCallback>>>;

struct MonitorState {
    stop_tx: Sender<()>,
    callback: CallbackSlot,
}

impl std::fmt::Debug for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorState").finish_non_exhaustive()
    }
}

fn state() -> &'static Mutex<Option<MonitorState>> {
    static STATE: OnceLock<Mutex<Option<MonitorState>>> = OnceLock::new();
    STATE.get_or_init(|| Mutex::new(None))
}

fn device_paths(devices: &[Device]) -> Vec<String> {
    devices.iter().map(|d| d.id().to_string()).collect()
}

fn dispatch(callback: &CallbackSlot, added: bool, path: &str) {
    // The slot lock is released before the callback runs so a
    // concurrent unregister never waits on user code.
    let taken = {
        let mut slot = callback.lock().unwrap_or_else(|e| e.into_inner());
        slot.take()
    };

    let Some(mut cb) = taken else { return };

    if catch_unwind(AssertUnwindSafe(|| cb(added, path))).is_err() {
        log_error(&format!(
            "device change callback panicked (added={added}, path={path})"
        ));
    }

    // Put the callback back unless an unregister/replace happened while
    // it ran (the slot being occupied again means replacement).
    let mut slot = callback.lock().unwrap_or_else(|e| e.into_inner());
    if slot.is_none() {
        *slot = Some(cb);
    }
}

fn watcher_loop(callback: CallbackSlot, stop_rx: crossbeam_channel::Receiver<()>) {
    let mut known: HashSet<String> = match platform().list_devices() {
        Ok(devices) => device_paths(&devices).into_iter().collect(),
        Err(_) => HashSet::new(),
    };

    loop {
        match stop_rx.recv_timeout(POLL_INTERVAL) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let Ok(devices) = platform().list_devices() else {
            continue;
        };
        let current = device_paths(&devices);
        let current_set: HashSet<String> = current.iter().cloned().collect();

        // Removals first, then arrivals, each in enumeration order.
        let removed: Vec<&String> = known.iter().filter(|p| !current_set.contains(*p)).collect();
        for path in removed {
            log_debug(&format!("device removed: {path}"));
            dispatch(&callback, false, path);
        }
        for path in &current {
            if !known.contains(path) {
                log_debug(&format!("device added: {path}"));
                dispatch(&callback, true, path);
            }
        }

        known = current_set;
    }
}

/// Register the observer, replacing any previous one, and start
/// delivery. Re-registering while the monitor runs swaps the callback
/// without restarting the watcher.
pub fn register_device_change_callback(callback: DeviceChangeCallback) -> Result<()> {
    let mut guard = state().lock().unwrap_or_else(|e| e.into_inner());

    if let Some(running) = &*guard {
        let mut slot = running.callback.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(callback);
        log_debug("device change callback replaced");
        return Ok(());
    }

    let slot: CallbackSlot = Arc::new(Mutex::new(Some(callback)));
    let (stop_tx, stop_rx) = bounded::<()>(1);

    let thread_slot = slot.clone();
    thread::Builder::new()
        .name("uvcctl-hotplug".into())
        .spawn(move || watcher_loop(thread_slot, stop_rx))
        .map_err(|e| {
            Error::new(
                ErrorCode::SystemError,
                format!("failed to start hotplug watcher: {e}"),
            )
        })?;

    *guard = Some(MonitorState {
        stop_tx,
        callback: slot,
    });
    log_info("device change monitoring started");
    Ok(())
}

/// Stop delivery and discard the observer. An in-flight notification
/// may still complete; no new ones are scheduled afterwards.
pub fn unregister_device_change_callback() {
    let mut guard = state().lock().unwrap_or_else(|e| e.into_inner());
    if let Some(running) = guard.take() {
        {
            let mut slot = running.callback.lock().unwrap_or_else(|e| e.into_inner());
            *slot = None;
        }
        let _ = running.stop_tx.send(());
        log_info("device change monitoring stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // The monitor is a process-wide singleton; serialize its tests.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn register_then_unregister() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        register_device_change_callback(Box::new(|_, _| {})).unwrap();
        unregister_device_change_callback();
        // Idempotent.
        unregister_device_change_callback();
    }

    #[test]
    fn re_register_replaces_the_observer() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = hits.clone();

        register_device_change_callback(Box::new(move |_, _| {
            hits2.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        register_device_change_callback(Box::new(|_, _| {})).unwrap();
        unregister_device_change_callback();

        // The first observer was replaced before any event could fire
        // on a deviceless host.
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_swallows_panics() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(Box::new(|_, _| {
            panic!("observer bug");
        }))));
        dispatch(&slot, true, "somepath");
        // The callback survives its own panic and stays registered.
        assert!(slot.lock().unwrap().is_some());
        // And the next dispatch still goes through the panicking path
        // without poisoning the monitor.
        dispatch(&slot, false, "somepath");
    }

    #[test]
    fn dispatch_with_empty_slot_is_a_no_op() {
        let slot: CallbackSlot = Arc::new(Mutex::new(None));
        dispatch(&slot, true, "path");
    }
}
