//! Error types for the logger system

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation} '{path}': {source}")]
    IoOperation {
        operation: String,
        path: String,
        #[source]
        source: io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Write or close on a writer whose sink is already released
    #[error("Writer '{writer}' is closed")]
    WriterClosed { writer: String },

    /// A writer panicked while handling a message
    #[error("Writer '{writer}' panicked: {message}")]
    WriterPanicked { writer: String, message: String },

    /// Unknown level name
    #[error("Invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Several writers failed during the same operation
    #[error("{}", AggregateDisplay(.0))]
    Aggregate(Vec<LoggerError>),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

struct AggregateDisplay<'a>(&'a [LoggerError]);

impl fmt::Display for AggregateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a closed-writer error
    pub fn writer_closed(writer: impl Into<String>) -> Self {
        LoggerError::WriterClosed {
            writer: writer.into(),
        }
    }

    /// Create a writer panic error
    pub fn writer_panicked(writer: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::WriterPanicked {
            writer: writer.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Fold a list of errors into a single value.
    ///
    /// Returns `Ok(())` for an empty list, the error itself when there is
    /// exactly one, and [`LoggerError::Aggregate`] otherwise.
    pub fn join(mut errors: Vec<LoggerError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LoggerError::Aggregate(errors)),
        }
    }

    /// The IO error kind behind this error, if any.
    ///
    /// Closed writers report [`io::ErrorKind::NotFound`].
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            LoggerError::IoOperation { source, .. } => Some(source.kind()),
            LoggerError::IoError(err) => Some(err.kind()),
            LoggerError::WriterClosed { .. } => Some(io::ErrorKind::NotFound),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::writer_closed("file");
        assert!(matches!(err, LoggerError::WriterClosed { .. }));

        let err = LoggerError::config("FileWriter", "Invalid path");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::writer_panicked("memory", "boom");
        assert!(matches!(err, LoggerError::WriterPanicked { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::writer_closed("/var/log/app.log");
        assert_eq!(err.to_string(), "Writer '/var/log/app.log' is closed");

        let err = LoggerError::InvalidLevel("loud".to_string());
        assert_eq!(err.to_string(), "Invalid log level: 'loud'");

        let err = LoggerError::config("LoggerConfig", "no writers");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LoggerConfig: no writers"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening", "/root/app.log", io_err);

        assert!(err.to_string().contains("opening"));
        assert!(err.to_string().contains("/root/app.log"));
        assert_eq!(err.kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_closed_writer_is_not_found_kind() {
        let err = LoggerError::writer_closed("file");
        assert_eq!(err.kind(), Some(io::ErrorKind::NotFound));
        assert_eq!(LoggerError::other("x").kind(), None);
    }

    #[test]
    fn test_join() {
        assert!(LoggerError::join(Vec::new()).is_ok());

        let single = LoggerError::join(vec![LoggerError::other("a")]).unwrap_err();
        assert_eq!(single.to_string(), "a");

        let many =
            LoggerError::join(vec![LoggerError::other("a"), LoggerError::other("b")]).unwrap_err();
        assert!(matches!(many, LoggerError::Aggregate(ref errs) if errs.len() == 2));
        assert_eq!(many.to_string(), "a\nb");
    }
}
