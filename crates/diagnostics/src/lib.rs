//! Structured logging shared by the memfs crates.
//!
//! Logging is off unless `MEMFS_LOG` selects a level:
//! - `MEMFS_LOG=off` (default) - nothing is emitted
//! - `MEMFS_LOG=error` / `warn` - failures and degraded states only
//! - `MEMFS_LOG=info` - one event per namespace mutation
//! - `MEMFS_LOG=debug` - key computation, classification, scan paging

use std::sync::Once;

// Re-exported so the macros below resolve `$crate::emit` in dependent crates
pub use emit;

/// Environment variable that selects the log level
pub const LOG_ENV: &str = "MEMFS_LOG";

static INIT: Once = Once::new();

/// Map a `MEMFS_LOG` value to a minimum level.
///
/// `Ok(None)` means logging stays disabled; `Err` carries the unrecognized value.
pub fn parse_level(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "error" => Ok(Some(emit::Level::Error)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "info" => Ok(Some(emit::Level::Info)),
        "debug" => Ok(Some(emit::Level::Debug)),
        other => Err(other.to_string()),
    }
}

/// Install the stderr emitter according to `MEMFS_LOG`.
///
/// Only the first call has any effect, so libraries and binaries can both
/// call it without coordinating.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_default();
        let level = match parse_level(&raw) {
            Ok(None) => return,
            Ok(Some(level)) => level,
            Err(unknown) => {
                // No emitter exists yet, so this one goes straight to stderr
                eprintln!("Warning: unknown {LOG_ENV} value '{unknown}', using 'info'");
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive every event the process emits.
        std::mem::forget(rt);
    });
}

/// Successful namespace mutations: "Created /memories/a.md"
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Internal decisions: computed keys, classification results, scan pages
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Degraded but recoverable states, such as a half-applied rename step
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures surfaced to the caller
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), Ok(None));
        assert_eq!(parse_level(""), Ok(None));
        assert_eq!(parse_level("DEBUG"), Ok(Some(emit::Level::Debug)));
        assert_eq!(parse_level(" warn "), Ok(Some(emit::Level::Warn)));
        assert_eq!(parse_level("verbose"), Err("verbose".to_string()));
    }

    #[test]
    fn test_init_is_idempotent() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_macros_accept_fields() {
        log_info!("Created {path}", path: "/memories/a.md");
        log_debug!("Scan page with {count} keys", count: 3);
        warn!("Rename step failed for {key}", key: "memory:/memories/a");
        error!("Store unavailable");
    }
}
