//! Error handlers for write and close failures
//!
//! Emission methods never return errors to the caller. Instead every failed
//! writer produces one [`LoggerError`] that the logger hands to its
//! [`ErrorHandler`], one error at a time, after all writers have finished.

use super::error::LoggerError;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: LoggerError);
}

pub type SharedErrorHandler = Arc<dyn ErrorHandler>;

impl<F> ErrorHandler for F
where
    F: Fn(LoggerError) + Send + Sync,
{
    fn handle(&self, error: LoggerError) {
        self(error)
    }
}

/// Drops every error. Installed by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardErrorHandler;

impl ErrorHandler for DiscardErrorHandler {
    fn handle(&self, _error: LoggerError) {}
}

/// Reports errors on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrErrorHandler;

impl ErrorHandler for StderrErrorHandler {
    fn handle(&self, error: LoggerError) {
        eprintln!("[LOGGER ERROR] {}", error);
    }
}

/// Keeps every error in memory.
#[derive(Debug, Default)]
pub struct CollectingErrorHandler {
    errors: Mutex<Vec<LoggerError>>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<LoggerError> {
        std::mem::take(&mut *self.errors.lock())
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn handle(&self, error: LoggerError) {
        self.errors.lock().push(error);
    }
}

pub(crate) fn default_error_handler() -> SharedErrorHandler {
    Arc::new(DiscardErrorHandler)
}
