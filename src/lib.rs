//! # Rust Structured Logger
//!
//! A structured logging library built around immutable logger values.
//!
//! ## Features
//!
//! - **Level Gating**: Disabled calls do no formatting and no I/O
//! - **Structured Fields**: Key/value, logfmt and JSON rendering
//! - **Immutable Derivation**: `with_*` methods never touch the parent logger
//! - **Multi-Writer Fan-out**: Serial or concurrent dispatch with per-writer error isolation
//! - **Conditional Logging**: Composable conditions for rate limiting, sampling and environment checks
//!
//! ## Example
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let writer = Arc::new(MemoryWriter::new());
//! let logger = Logger::new(LogLevel::Info, Some(writer.clone()), vec![with_tag("api")]);
//!
//! logger.with_field("user", "john").info("logged in");
//! logger.debug("not emitted");
//!
//! assert_eq!(writer.contents(), "INFO api user=john logged in\n");
//! ```

pub mod core;
pub mod macros;
pub mod writers;

pub use crate::core::{condition, context, formatter, prefix};

pub mod prelude {
    pub use crate::core::condition::{self, SharedCondition};
    pub use crate::core::prefix::{
        with_fields_prefix, with_json_fields, with_log_level, with_logfmt_fields, with_tag,
        with_timestamp, with_timestamp_format,
    };
    pub use crate::core::{
        from_context, CollectingErrorHandler, Context, ContextKey, DiscardErrorHandler,
        ErrorHandler, FieldValue, Fields, FieldsFormatter, JsonFormatter, KeyValueFormatter,
        LogLevel, LogWriter, LogfmtFormatter, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        OutputFormat, PrefixBuilder, Result, SharedErrorHandler, SharedFormatter, SharedPrefix,
        SharedWriter, StderrErrorHandler, TimestampFormat,
    };
    pub use crate::writers::{FileWriter, MemoryWriter, StdOutWriter};
}

pub use crate::core::{
    Context, FieldValue, Fields, LogLevel, LogWriter, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, OutputFormat, Result,
};
pub use crate::writers::{FileWriter, MemoryWriter, StdOutWriter};
