//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log message.
///
/// Levels are totally ordered by their integer value, from `Trace` (-1) up to
/// `Panic` (5). A message is emitted when its level is at or above the
/// logger's minimum level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum LogLevel {
    Trace = -1,
    Debug = 0,
    #[default]
    Info = 1,
    Warning = 2,
    Error = 3,
    Fatal = 4,
    Panic = 5,
}

impl LogLevel {
    /// All levels in ascending severity order.
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Panic => "PANIC",
        }
    }

    /// Canonical name for a raw level value, `"UNKNOWN"` when out of range.
    pub fn level_name(value: i32) -> &'static str {
        LogLevel::try_from(value)
            .map(|level| level.to_str())
            .unwrap_or("UNKNOWN")
    }

    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i8 as i32
    }

    /// Whether a message at this level passes a `min` threshold.
    #[inline]
    pub fn is_enabled(self, min: LogLevel) -> bool {
        self >= min
    }

    #[inline]
    pub fn should_exit(self) -> bool {
        self >= LogLevel::Fatal
    }

    #[inline]
    pub fn should_panic(self) -> bool {
        self == LogLevel::Panic
    }

    /// Terminate the process with exit code 1 if this level demands it.
    pub fn exit(self) {
        if self.should_exit() {
            std::process::exit(1);
        }
    }

    /// Unwind the current thread with `message` as payload if this level demands it.
    pub fn panic(self, message: &str) {
        if self.should_panic() {
            std::panic::panic_any(message.to_string());
        }
    }

    /// Read a level name from an environment variable.
    ///
    /// Returns `Ok(None)` when the variable is unset.
    pub fn from_env(var: &str) -> Result<Option<Self>, LoggerError> {
        match std::env::var(var) {
            Ok(value) => value.parse().map(Some),
            Err(_) => Ok(None),
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::Panic => Magenta,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl TryFrom<i32> for LogLevel {
    type Error = LoggerError;

    fn try_from(value: i32) -> Result<Self, LoggerError> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_i32() == value)
            .ok_or_else(|| LoggerError::InvalidLevel(value.to_string()))
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "PANIC" => Ok(LogLevel::Panic),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}
