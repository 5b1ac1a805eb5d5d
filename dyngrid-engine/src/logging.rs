//! FILENAME: dyngrid-engine/src/logging.rs
// PURPOSE: Sequenced, categorized logging on top of the `log` facade.

use std::sync::atomic::{AtomicU64, Ordering};

use log::Level;

// ============================================================================
// SEQUENCED LOGGING
// ============================================================================

/// Target every engine log line is emitted under.
pub const LOG_TARGET: &str = "dyngrid";

/// Global sequence counter shared by every grid instance in the process
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Whether the installed logger accepts lines at this level.
/// The macros check this before formatting anything.
pub fn enabled(level: Level) -> bool {
    log::log_enabled!(target: LOG_TARGET, level)
}

/// Write a log line in unified format: `seq|category|message`.
pub fn write_log(level: Level, category: &str, message: &str) {
    let seq = next_seq();
    log::log!(target: LOG_TARGET, level, "{}|{}|{}", seq, category, message);
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: Level, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: Level, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled(::log::Level::Debug) {
            $crate::logging::write_log(::log::Level::Debug, $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled(::log::Level::Info) {
            $crate::logging::write_log(::log::Level::Info, $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled(::log::Level::Warn) {
            $crate::logging::write_log(::log::Level::Warn, $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled(::log::Level::Error) {
            $crate::logging::write_log(::log::Level::Error, $cat, &format!($($arg)*))
        }
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        if $crate::logging::enabled(::log::Level::Debug) {
            $crate::logging::write_log_enter(::log::Level::Debug, $cat, $func, "")
        }
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        if $crate::logging::enabled(::log::Level::Debug) {
            $crate::logging::write_log_enter(::log::Level::Debug, $cat, $func, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        if $crate::logging::enabled(::log::Level::Debug) {
            $crate::logging::write_log_exit(::log::Level::Debug, $cat, $func, "")
        }
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        if $crate::logging::enabled(::log::Level::Debug) {
            $crate::logging::write_log_exit(::log::Level::Debug, $cat, $func, &format!($($arg)*))
        }
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_info;`
pub use log_debug;
pub use log_info;
pub use log_warn;
pub use log_error;
pub use log_enter;
pub use log_exit;
