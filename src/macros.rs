//! Logging macros for ergonomic log message formatting.
//!
//! These macros forward to the `*_fmt` methods on [`Logger`](crate::Logger)
//! with `format_args!`, so arguments are only rendered when the message
//! passes the level gate.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::info;
//! use std::sync::Arc;
//!
//! let writer = Arc::new(MemoryWriter::new());
//! let logger = Logger::new(LogLevel::Info, Some(writer.clone()), Vec::new());
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(writer.lines(), vec!["INFO Server started", "INFO Server listening on port 8080"]);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(LogLevel::Info, Some(std::sync::Arc::new(MemoryWriter::new())), Vec::new());
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_fmt($level, format_args!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.trace_fmt(format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug_fmt(format_args!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info_fmt(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(LogLevel::Info, Some(std::sync::Arc::new(MemoryWriter::new())), Vec::new());
/// use rust_structured_logger::warning;
/// warning!(logger, "Low disk space");
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warning_fmt(format_args!($($arg)+))
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error_fmt(format_args!($($arg)+))
    };
}

/// Log a fatal-level message and exit the process with status 1.
///
/// # Examples
///
/// ```no_run
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(LogLevel::Info, None, Vec::new());
/// use rust_structured_logger::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal_fmt(format_args!($($arg)+))
    };
}

/// Log a panic-level message and unwind with the formatted message.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic_fmt(format_args!($($arg)+))
    };
}

/// Build a [`Fields`](crate::Fields) set from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use rust_structured_logger::fields;
///
/// let fields = fields! { "user" => "john", "attempt" => 3 };
/// assert_eq!(fields.len(), 2);
/// assert!(fields!{}.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Fields::new()$(.with($key, $value))+
    };
}
