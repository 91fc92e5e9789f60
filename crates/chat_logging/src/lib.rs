#![deny(missing_docs)]
//! Shared logging utilities for the chat widget workspace.
//!
//! This crate provides the `chat_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is tagged
//! with the exchange currently being driven on the calling thread.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

/// Log target shared by all `chat_*` macros.
pub const LOG_TARGET: &str = "chat";

thread_local! {
    /// Exchange id the current thread is working on; 0 when idle.
    static EXCHANGE: Cell<u64> = const { Cell::new(0) };
}

/// Marks the exchange the current thread is driving.
/// The pipeline worker calls this before running each submitted message.
pub fn set_exchange(exchange_id: u64) {
    EXCHANGE.with(|v| v.set(exchange_id));
}

/// Returns the exchange id set for the current thread, or 0 if none.
pub fn current_exchange() -> u64 {
    EXCHANGE.with(|v| v.get())
}

/// Logs a trace-level message under the chat target.
#[macro_export]
macro_rules! chat_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!(target: $crate::LOG_TARGET, "[x{}] {}", $crate::current_exchange(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message under the chat target.
#[macro_export]
macro_rules! chat_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!(target: $crate::LOG_TARGET, "[x{}] {}", $crate::current_exchange(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message under the chat target.
#[macro_export]
macro_rules! chat_info {
    ($($arg:tt)*) => {{
        $crate::log::info!(target: $crate::LOG_TARGET, "[x{}] {}", $crate::current_exchange(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message under the chat target.
#[macro_export]
macro_rules! chat_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!(target: $crate::LOG_TARGET, "[x{}] {}", $crate::current_exchange(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message under the chat target.
#[macro_export]
macro_rules! chat_error {
    ($($arg:tt)*) => {{
        $crate::log::error!(target: $crate::LOG_TARGET, "[x{}] {}", $crate::current_exchange(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have won the race to install a logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Never,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_id_is_per_thread() {
        set_exchange(7);
        assert_eq!(current_exchange(), 7);

        let other = std::thread::spawn(current_exchange).join().unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn macros_accept_format_arguments() {
        initialize_for_tests();
        set_exchange(3);
        chat_info!("validated {} chars", 12);
        chat_debug!("plain message");
        chat_warn!("status {code}", code = 500);
    }
}
