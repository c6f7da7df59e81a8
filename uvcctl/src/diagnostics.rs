//! Error decoding, operation statistics, and the diagnostic report.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use uvcctl_core::error::ErrorCode;

static TOTAL_OPERATIONS: AtomicU64 = AtomicU64::new(0);
static TOTAL_ERRORS: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNTS: Mutex<BTreeMap<ErrorCode, u64>> = Mutex::new(BTreeMap::new());

/// Count one operation outcome. `Success` counts as an operation only.
pub fn record_operation(code: ErrorCode) {
    TOTAL_OPERATIONS.fetch_add(1, Ordering::Relaxed);
    if code != ErrorCode::Success {
        TOTAL_ERRORS.fetch_add(1, Ordering::Relaxed);
        let mut counts = ERROR_COUNTS.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(code).or_insert(0) += 1;
    }
}

pub fn reset_error_statistics() {
    TOTAL_OPERATIONS.store(0, Ordering::Relaxed);
    TOTAL_ERRORS.store(0, Ordering::Relaxed);
    ERROR_COUNTS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clear();
}

pub fn operation_counts() -> (u64, u64) {
    (
        TOTAL_OPERATIONS.load(Ordering::Relaxed),
        TOTAL_ERRORS.load(Ordering::Relaxed),
    )
}

/// Multi-line statistics report with a per-code breakdown.
pub fn error_statistics() -> String {
    let (total_ops, total_errs) = operation_counts();

    let mut out = String::new();
    let _ = writeln!(out, "Error Statistics:");
    let _ = writeln!(out, "================");
    let _ = writeln!(out, "Total Operations: {total_ops}");
    let _ = writeln!(out, "Total Errors: {total_errs}");
    if total_ops > 0 {
        let success_rate = (total_ops - total_errs) as f64 / total_ops as f64 * 100.0;
        let _ = writeln!(out, "Success Rate: {success_rate:.2}%");
    }

    let counts = ERROR_COUNTS.lock().unwrap_or_else(|e| e.into_inner());
    if !counts.is_empty() {
        let _ = writeln!(out, "\nDetailed Error Breakdown:");
        let _ = writeln!(out, "========================");
        for (code, count) in counts.iter() {
            let percentage = if total_errs > 0 {
                *count as f64 / total_errs as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "{code}: {count} ({percentage:.1}%)");
        }
    }

    out
}

/// Localized message for a raw Win32 error code where the system has
/// one, else a stable hex spelling.
pub fn decode_system_error(code: u32) -> String {
    #[cfg(target_os = "windows")]
    {
        uvcctl_backend_dshow::decode::decode_win32_error(code)
    }
    #[cfg(not(target_os = "windows"))]
    {
        format!("System error 0x{code:08X}")
    }
}

/// Localized message for a host HRESULT, else a stable hex spelling.
pub fn decode_host_error(code: i32) -> String {
    #[cfg(target_os = "windows")]
    {
        uvcctl_backend_dshow::decode::decode_hresult_code(code)
    }
    #[cfg(not(target_os = "windows"))]
    {
        format!("HRESULT 0x{:08X}", code as u32)
    }
}

/// Multi-line report: platform, version, host-stack availability, and
/// the operation counters.
pub fn diagnostic_info() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "uvcctl Diagnostic Information");
    let _ = writeln!(out, "=============================");
    let _ = writeln!(out, "Version: {}", crate::VERSION);

    #[cfg(target_os = "windows")]
    {
        let _ = writeln!(out, "Platform: Windows");
        let available = uvcctl_backend_dshow::host_stack_available();
        let _ = writeln!(
            out,
            "DirectShow: {}",
            if available { "Available" } else { "Unavailable" }
        );
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = writeln!(out, "Platform: Non-Windows (stub backend)");
        let _ = writeln!(out, "DirectShow: Unavailable");
    }

    let (total_ops, total_errs) = operation_counts();
    let _ = writeln!(out, "Operations: {total_ops}");
    let _ = writeln!(out, "Errors: {total_errs}");

    out
}

/// Actionable suggestions for an error category.
pub fn suggest_error_resolution(code: ErrorCode) -> String {
    let mut out = format!("Resolution suggestions for: {code}\n\n");
    let body = match code {
        ErrorCode::DeviceNotFound => {
            "1. Check that the camera is physically connected\n\
             2. Verify the camera appears in Device Manager\n\
             3. Try reconnecting the USB cable\n\
             4. Check if device drivers are properly installed\n"
        }
        ErrorCode::DeviceBusy => {
            "1. Close other applications using the camera\n\
             2. Check for background processes holding the device\n\
             3. Wait a moment and try again\n"
        }
        ErrorCode::PermissionDenied => {
            "1. Run the application with elevated privileges\n\
             2. Check the system camera privacy settings\n\
             3. Verify security software is not blocking camera access\n"
        }
        ErrorCode::PropertyNotSupported => {
            "1. Check device capabilities before setting properties\n\
             2. Verify the property is supported by this camera model\n"
        }
        ErrorCode::InvalidValue => {
            "1. Query the property range first\n\
             2. Keep values inside the min/max bounds\n\
             3. Check step-size alignment\n"
        }
        ErrorCode::ConnectionFailed => {
            "1. Check the USB connection and cable quality\n\
             2. Try a different USB port\n\
             3. Update the camera drivers\n"
        }
        ErrorCode::SystemError => {
            "1. Check system logs for details\n\
             2. Verify DirectShow components are installed\n\
             3. Try reinstalling the camera drivers\n"
        }
        _ => {
            "1. Check the detailed error information\n\
             2. Enable debug logging for more context\n"
        }
    };
    out.push_str(body);
    out.push_str(
        "\nGeneral troubleshooting:\n\
         - Enable debug logging (set_log_level(Debug))\n\
         - Inspect diagnostic_info() and error_statistics()\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are process-global; serialize the tests that mutate them.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn statistics_count_and_reset() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset_error_statistics();

        record_operation(ErrorCode::Success);
        record_operation(ErrorCode::DeviceNotFound);
        record_operation(ErrorCode::DeviceNotFound);
        record_operation(ErrorCode::Timeout);

        let (ops, errs) = operation_counts();
        assert_eq!(ops, 4);
        assert_eq!(errs, 3);

        let report = error_statistics();
        assert!(report.contains("Total Operations: 4"));
        assert!(report.contains("DeviceNotFound: 2"));
        assert!(report.contains("Timeout: 1"));

        reset_error_statistics();
        assert_eq!(operation_counts(), (0, 0));
        assert!(!error_statistics().contains("DeviceNotFound"));
    }

    #[test]
    fn diagnostic_report_names_platform_and_version() {
        let info = diagnostic_info();
        assert!(info.contains("Version:"));
        assert!(info.contains("Platform:"));
        assert!(info.contains("DirectShow:"));
    }

    #[test]
    fn suggestions_exist_for_every_code() {
        for code in ErrorCode::ALL {
            let text = suggest_error_resolution(code);
            assert!(text.contains(code.as_str()));
            assert!(text.contains("General troubleshooting"));
        }
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn decoders_fall_back_to_hex() {
        assert_eq!(decode_system_error(0x1F), "System error 0x0000001F");
        assert_eq!(decode_host_error(-2147024891), "HRESULT 0x80070005");
    }
}
