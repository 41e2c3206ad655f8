//! In-memory writer

use crate::core::{LogWriter, LoggerError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Captures written lines in memory.
///
/// Useful for tests and for embedding the logger where output is forwarded
/// elsewhere. A failing writer rejects every write and close, which makes it
/// handy for exercising error handlers.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    buffer: Mutex<Vec<u8>>,
    writes: AtomicUsize,
    closed: AtomicBool,
    fail: bool,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose writes and closes always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written content split into lines without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Number of write calls received, failed ones included.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl LogWriter for MemoryWriter {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LoggerError::other("memory writer failure"));
        }
        if self.is_closed() {
            return Err(LoggerError::writer_closed(self.name()));
        }

        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&self) -> Result<()> {
        if self.fail {
            return Err(LoggerError::other("memory writer failure"));
        }
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(LoggerError::writer_closed(self.name()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
