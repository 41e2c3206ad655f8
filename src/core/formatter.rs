//! Field formatters
//!
//! A formatter renders a [`Fields`] snapshot into the text segment placed
//! between the prefixes and the message body:
//! - `KeyValueFormatter`: `a=1 b=2` with a configurable pair separator (default)
//! - `LogfmtFormatter`: logfmt pairs, quoting values that contain spaces or `=`
//! - `JsonFormatter`: a single JSON object
//!
//! Every built-in renders empty fields as the empty string.

use super::error::LoggerError;
use super::fields::Fields;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Strategy turning a field set into a rendered string.
pub trait FieldsFormatter: Send + Sync {
    fn format(&self, fields: &Fields) -> String;
}

pub type SharedFormatter = Arc<dyn FieldsFormatter>;

impl<F> FieldsFormatter for F
where
    F: Fn(&Fields) -> String + Send + Sync,
{
    fn format(&self, fields: &Fields) -> String {
        self(fields)
    }
}

/// `key=value` pairs sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueFormatter {
    separator: String,
}

impl KeyValueFormatter {
    pub const DEFAULT_SEPARATOR: &'static str = " ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// The effective separator; an empty configuration means a single space.
    pub fn separator(&self) -> &str {
        if self.separator.is_empty() {
            Self::DEFAULT_SEPARATOR
        } else {
            &self.separator
        }
    }
}

impl FieldsFormatter for KeyValueFormatter {
    fn format(&self, fields: &Fields) -> String {
        fields
            .sorted()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(self.separator())
    }
}

/// logfmt pairs sorted by key, always space separated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogfmtFormatter;

impl LogfmtFormatter {
    /// Quote a value when it contains a space or an equals sign
    fn escape_value(value: &str) -> String {
        if value.contains(' ') || value.contains('=') {
            format!("\"{}\"", value.replace('"', "\\\""))
        } else {
            value.to_string()
        }
    }
}

impl FieldsFormatter for LogfmtFormatter {
    fn format(&self, fields: &Fields) -> String {
        fields
            .sorted()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, Self::escape_value(&v.to_string())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The whole field set as one JSON object with sorted keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFormatter;

impl JsonFormatter {
    fn try_format(fields: &Fields) -> Result<String, LoggerError> {
        let object = fields
            .sorted()
            .into_iter()
            .map(|(k, v)| Ok((k.clone(), v.to_json_value()?)))
            .collect::<Result<serde_json::Map<String, serde_json::Value>, LoggerError>>()?;
        Ok(serde_json::to_string(&serde_json::Value::Object(object))?)
    }
}

impl FieldsFormatter for JsonFormatter {
    fn format(&self, fields: &Fields) -> String {
        if fields.is_empty() {
            return String::new();
        }

        match Self::try_format(fields) {
            Ok(rendered) => rendered,
            Err(err) => format!(r#"{{"error":"failed to marshal fields: {}"}}"#, err),
        }
    }
}

/// Built-in formatter selection, usable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `a=1 b=2`
    #[default]
    KeyValue,

    /// `a=1 msg="with spaces"`
    Logfmt,

    /// `{"a":1,"b":2}`
    Json,
}

impl OutputFormat {
    pub fn formatter(&self) -> SharedFormatter {
        match self {
            OutputFormat::KeyValue => Arc::new(KeyValueFormatter::new()),
            OutputFormat::Logfmt => Arc::new(LogfmtFormatter),
            OutputFormat::Json => Arc::new(JsonFormatter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::KeyValue => f.write_str("keyvalue"),
            OutputFormat::Logfmt => f.write_str("logfmt"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyvalue" | "key_value" | "kv" => Ok(OutputFormat::KeyValue),
            "logfmt" => Ok(OutputFormat::Logfmt),
            "json" => Ok(OutputFormat::Json),
            other => Err(LoggerError::config(
                "OutputFormat",
                format!("unknown format '{}'", other),
            )),
        }
    }
}

static DEFAULT_FORMATTER: RwLock<Option<SharedFormatter>> = parking_lot::const_rwlock(None);

/// The formatter new loggers capture when none is supplied.
///
/// Starts out as [`KeyValueFormatter`] with the default separator.
pub fn default_formatter() -> SharedFormatter {
    match DEFAULT_FORMATTER.read().as_ref() {
        Some(formatter) => Arc::clone(formatter),
        None => Arc::new(KeyValueFormatter::new()),
    }
}

/// Replace the process-wide default formatter.
///
/// Only loggers constructed afterwards pick it up; existing loggers keep the
/// formatter they captured.
pub fn set_default_formatter(formatter: SharedFormatter) {
    *DEFAULT_FORMATTER.write() = Some(formatter);
}

/// Restore the built-in key/value default.
pub fn reset_default_formatter() {
    *DEFAULT_FORMATTER.write() = None;
}
