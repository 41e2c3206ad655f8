//! Prefix builders
//!
//! A prefix builder produces a short decoration rendered between the level
//! name and the fields segment of every message. Prefixes render in the order
//! they were attached and empty strings are skipped when joining.

use super::fields::Fields;
use super::formatter::{default_formatter, JsonFormatter, LogfmtFormatter, SharedFormatter};
use super::log_level::LogLevel;
use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Strategy producing a decoration string independent of the message.
pub trait PrefixBuilder: Send + Sync {
    fn build(&self) -> String;
}

pub type SharedPrefix = Arc<dyn PrefixBuilder>;

impl<F> PrefixBuilder for F
where
    F: Fn() -> String + Send + Sync,
{
    fn build(&self) -> String {
        self()
    }
}

/// Timestamp formats for [`TimestampPrefix`]
///
/// # Examples
///
/// ```
/// use rust_structured_logger::prefix::TimestampFormat;
/// use chrono::{FixedOffset, TimeZone};
///
/// let at = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Rfc3339.format(&at), "2025-01-08T10:30:45Z");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with second precision: `2025-01-08T10:30:45+02:00`
    #[default]
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123+02:00`
    Iso8601Millis,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Iso8601Millis => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Format the current local time
    #[must_use]
    pub fn format_now(&self) -> String {
        self.format(&Local::now())
    }
}

/// Always renders the name of a fixed level, whatever level the message has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPrefix(pub LogLevel);

impl PrefixBuilder for LevelPrefix {
    fn build(&self) -> String {
        self.0.to_str().to_string()
    }
}

/// Renders the time of the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampPrefix {
    format: TimestampFormat,
}

impl TimestampPrefix {
    pub fn new(format: TimestampFormat) -> Self {
        Self { format }
    }
}

impl PrefixBuilder for TimestampPrefix {
    fn build(&self) -> String {
        self.format.format_now()
    }
}

/// Renders a fixed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPrefix(pub String);

impl PrefixBuilder for TagPrefix {
    fn build(&self) -> String {
        self.0.clone()
    }
}

/// Renders a fixed field set through a formatter.
pub struct FieldsPrefix {
    fields: Fields,
    formatter: SharedFormatter,
}

impl FieldsPrefix {
    pub fn new(fields: Fields, formatter: SharedFormatter) -> Self {
        Self { fields, formatter }
    }
}

impl PrefixBuilder for FieldsPrefix {
    fn build(&self) -> String {
        self.formatter.format(&self.fields)
    }
}

pub fn with_log_level(level: LogLevel) -> SharedPrefix {
    Arc::new(LevelPrefix(level))
}

/// RFC 3339 local time of the call
pub fn with_timestamp() -> SharedPrefix {
    Arc::new(TimestampPrefix::default())
}

pub fn with_timestamp_format(format: TimestampFormat) -> SharedPrefix {
    Arc::new(TimestampPrefix::new(format))
}

pub fn with_tag(tag: impl Into<String>) -> SharedPrefix {
    Arc::new(TagPrefix(tag.into()))
}

/// Fixed fields rendered with the default formatter current at this call.
pub fn with_fields_prefix(fields: Fields) -> SharedPrefix {
    with_fields_formatter_prefix(fields, default_formatter())
}

pub fn with_fields_formatter_prefix(fields: Fields, formatter: SharedFormatter) -> SharedPrefix {
    Arc::new(FieldsPrefix::new(fields, formatter))
}

pub fn with_json_fields(fields: Fields) -> SharedPrefix {
    with_fields_formatter_prefix(fields, Arc::new(JsonFormatter))
}

pub fn with_logfmt_fields(fields: Fields) -> SharedPrefix {
    with_fields_formatter_prefix(fields, Arc::new(LogfmtFormatter))
}
