//! Severity-filtered, callback-based logging.
//!
//! A single installed callback receives every message at or above the
//! configured level. Without a callback, messages are forwarded to the
//! `tracing` subscriber at the matching level, so embedders that only
//! configure `tracing` still see diagnostics.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

/// Log severities, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warning),
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync>;

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static CALLBACK: Mutex<Option<LogCallback>> = Mutex::new(None);

/// Install (or with `None`, remove) the log callback. Replaces any
/// previous callback.
pub fn set_log_callback(callback: Option<LogCallback>) {
    let mut slot = CALLBACK.lock().unwrap_or_else(|e| e.into_inner());
    *slot = callback;
}

pub fn set_log_level(level: LogLevel) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_log_level() -> LogLevel {
    LogLevel::from_u8(MIN_LEVEL.load(Ordering::Relaxed)).unwrap_or(LogLevel::Info)
}

/// Emit one message. Messages below the configured level are dropped
/// before they reach any sink.
pub fn log_message(level: LogLevel, message: &str) {
    if level < get_log_level() {
        return;
    }

    let slot = CALLBACK.lock().unwrap_or_else(|e| e.into_inner());
    match &*slot {
        Some(cb) => cb(level, message),
        None => emit_tracing(level, message),
    }
}

fn emit_tracing(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!("{message}"),
        LogLevel::Info => tracing::info!("{message}"),
        LogLevel::Warning => tracing::warn!("{message}"),
        LogLevel::Error | LogLevel::Critical => tracing::error!("{message}"),
    }
}

pub fn log_debug(message: &str) {
    log_message(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_message(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_message(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_message(LogLevel::Error, message);
}

pub fn log_critical(message: &str) {
    log_message(LogLevel::Critical, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Logging state is process-global; serialize the tests that touch it.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn counted_callback() -> (Arc<AtomicUsize>, LogCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let cb: LogCallback = Box::new(move |_level, _msg| {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        (count, cb)
    }

    #[test]
    fn messages_below_threshold_never_reach_callback() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let (count, cb) = counted_callback();
        set_log_callback(Some(cb));
        set_log_level(LogLevel::Warning);

        log_debug("dropped");
        log_info("dropped");
        log_warning("kept");
        log_error("kept");
        log_critical("kept");

        assert_eq!(count.load(Ordering::SeqCst), 3);

        set_log_callback(None);
        set_log_level(LogLevel::Info);
    }

    #[test]
    fn callback_replacement_is_total() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let (first, cb1) = counted_callback();
        let (second, cb2) = counted_callback();
        set_log_callback(Some(cb1));
        set_log_level(LogLevel::Debug);

        log_info("to first");
        set_log_callback(Some(cb2));
        log_info("to second");

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        set_log_callback(None);
        set_log_level(LogLevel::Info);
    }

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn level_round_trip() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Critical,
        ] {
            assert_eq!(LogLevel::from_u8(level as u8), Some(level));
        }
        assert_eq!(LogLevel::from_u8(5), None);
    }
}
