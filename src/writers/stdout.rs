//! Standard output writer

use crate::core::{LogWriter, Result};
#[cfg(feature = "console")]
use crate::core::LogLevel;
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::{self, Write};

/// Writes every line to standard output.
///
/// Writes never fail from the logger's point of view and closing is a no-op,
/// so a logger built around this writer can be closed any number of times.
#[derive(Debug, Clone, Default)]
pub struct StdOutWriter {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
}

impl StdOutWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour the leading level name of each line.
    ///
    /// Only takes effect with the `console` feature.
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    #[cfg(feature = "console")]
    fn colorize(&self, buf: &[u8]) -> Option<String> {
        if !self.use_colors {
            return None;
        }
        let line = std::str::from_utf8(buf).ok()?;
        let (head, rest) = line.split_once(' ')?;
        let level = LogLevel::ALL.into_iter().find(|level| level.to_str() == head)?;
        Some(format!("{} {}", head.color(level.color_code()), rest))
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, _buf: &[u8]) -> Option<String> {
        None
    }
}

impl LogWriter for StdOutWriter {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut stdout = io::stdout().lock();
        // Errors on stdout are not reported; the full length is always claimed.
        let _ = match self.colorize(buf) {
            Some(colored) => stdout.write_all(colored.as_bytes()),
            None => stdout.write_all(buf),
        };
        Ok(buf.len())
    }

    fn close(&self) -> Result<()> {
        let _ = io::stdout().flush();
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_reports_full_length() {
        let writer = StdOutWriter::new();
        assert_eq!(writer.write(b"INFO stdout writer test\n").unwrap(), 24);
        assert_eq!(writer.write_str("").unwrap(), 0);
    }

    #[test]
    fn test_close_is_repeatable() {
        let writer = StdOutWriter::new();
        assert!(writer.close().is_ok());
        assert!(writer.close().is_ok());
        assert!(writer.write(b"after close\n").is_ok());
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_colorize_only_known_levels() {
        colored::control::set_override(true);
        let writer = StdOutWriter::with_colors(true);
        let colored = writer.colorize(b"ERROR boom\n").unwrap();
        assert!(colored.ends_with(" boom\n"));
        assert!(colored.contains("\u{1b}["));
        assert!(writer.colorize(b"hello world\n").is_none());
        assert!(writer.colorize(b"info starts the body\n").is_none());
        assert!(writer.colorize(b"WARN is an alias\n").is_none());
        assert!(writer.colorize(b"WARNING disk\n").is_some());
        assert!(StdOutWriter::new().colorize(b"ERROR boom\n").is_none());
    }
}
