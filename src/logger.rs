// This file implements the launcher's logging system.
// It provides macros for the four log levels (INFO, WARN, ERROR, DEBUG) and
// gates debug output behind a process-wide flag set once from `--debug`.
// Every line goes to stderr so that stdout stays clean for `--json` outcomes.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

// `log_info!` for general progress of a command.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "[INFO]".bright_green(), format!($($arg)*))
    }};
}

// `log_warn!` for conditions the user should know about but that don't fail the command.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "[WARN]".bright_yellow(), format!($($arg)*))
    }};
}

// `log_error!` for failures surfaced at a command boundary.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "[ERROR]".bright_red(), format!($($arg)*))
    }};
}

// `log_debug!` for internal detail; only printed when `--debug` was passed.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            use colored::Colorize;
            eprintln!("{} {}", "[DEBUG]".dimmed(), format!($($arg)*));
        }
    };
}

static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger, setting the global debug mode.
/// Called once from `main` before any command runs.
pub fn init(debug: bool) {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    if debug {
        log_debug!("Logger initialized in DEBUG mode");
    }
}

/// Returns `true` when debug logging was requested. `false` if `init` never ran.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|f| f.load(Ordering::Relaxed))
        .unwrap_or(false)
}
