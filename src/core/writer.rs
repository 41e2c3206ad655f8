//! Writer trait for log output destinations

use super::error::Result;
use std::sync::Arc;

/// A sink accepting rendered log lines.
///
/// Writers are shared between a logger and every logger derived from it, so
/// they take `&self` and must tolerate concurrent calls.
pub trait LogWriter: Send + Sync {
    /// Write `buf`, returning the number of bytes accepted.
    fn write(&self, buf: &[u8]) -> Result<usize>;

    fn write_str(&self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }

    /// Release the underlying sink. Closing twice is not guaranteed to succeed.
    fn close(&self) -> Result<()>;

    fn name(&self) -> &str {
        "writer"
    }
}

pub type SharedWriter = Arc<dyn LogWriter>;
