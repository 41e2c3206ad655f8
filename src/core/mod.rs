//! Core logger types and traits

pub mod condition;
pub mod context;
pub mod error;
pub mod error_handler;
pub mod fields;
pub mod formatter;
pub mod log_level;
pub mod logger;
pub mod prefix;
pub mod writer;

pub use condition::{
    Condition, ContextCondition, LevelCondition, SharedCondition, SharedContextCondition,
    SharedLevelCondition,
};
pub use context::{attach_logger, from_context, Context, ContextKey};
pub use error::{LoggerError, Result};
pub use error_handler::{
    CollectingErrorHandler, DiscardErrorHandler, ErrorHandler, SharedErrorHandler,
    StderrErrorHandler,
};
pub use fields::{FieldValue, Fields};
pub use formatter::{
    default_formatter, reset_default_formatter, set_default_formatter, FieldsFormatter,
    JsonFormatter, KeyValueFormatter, LogfmtFormatter, OutputFormat, SharedFormatter,
};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerConfig};
pub use prefix::{PrefixBuilder, SharedPrefix, TimestampFormat};
pub use writer::{LogWriter, SharedWriter};
