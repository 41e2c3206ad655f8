//! File writer implementation

use crate::core::{LogWriter, LoggerError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends lines to a file and syncs each write to disk before returning.
///
/// The file is opened in append/create mode on construction. After
/// [`close`](LogWriter::close) every write fails with
/// [`LoggerError::WriterClosed`], and so does a second close.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileWriter {
    /// Open `path` for appending, creating it when missing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_structured_logger::writers::FileWriter;
    ///
    /// let writer = FileWriter::new("/var/log/app.log").unwrap();
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::io_operation("opening log file", path.display().to_string(), e))?;

        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    fn closed_error(&self) -> LoggerError {
        LoggerError::writer_closed(self.path.display().to_string())
    }

    fn append(file: &mut File, buf: &[u8]) -> std::io::Result<()> {
        #[cfg(feature = "file")]
        {
            use fs2::FileExt;
            file.lock_exclusive()?;
            let result = file.write_all(buf).and_then(|_| file.sync_all());
            let _ = file.unlock();
            result
        }

        #[cfg(not(feature = "file"))]
        {
            file.write_all(buf)?;
            file.sync_all()
        }
    }
}

impl LogWriter for FileWriter {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or_else(|| self.closed_error())?;

        Self::append(file, buf).map_err(|e| {
            LoggerError::io_operation("writing to log file", self.path.display().to_string(), e)
        })?;
        Ok(buf.len())
    }

    fn close(&self) -> Result<()> {
        let file = self.file.lock().take().ok_or_else(|| self.closed_error())?;
        file.sync_all().map_err(|e| {
            LoggerError::io_operation("closing log file", self.path.display().to_string(), e)
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}
