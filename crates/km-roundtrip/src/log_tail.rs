//! Engine log tail
//!
//! The engine reports some failures only in its log, after the triggering
//! process has already exited successfully. A checkpoint taken before an
//! operation lets the caller collect exactly the error lines written since.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{EngineError, EngineResult};

/// Source of asynchronously reported engine errors
pub trait LogSource {
    /// Forget everything written so far
    fn checkpoint(&mut self) -> EngineResult<()>;

    /// Error lines written since the last checkpoint; advances the checkpoint
    fn new_error_lines(&mut self) -> EngineResult<Vec<String>>;
}

/// Tails a log file from a byte offset
#[derive(Debug)]
pub struct FileLogTail {
    path: PathBuf,
    pattern: Regex,
    offset: u64,
}

impl FileLogTail {
    /// Tail `path`, keeping lines matching `pattern`
    pub fn new(path: impl Into<PathBuf>, pattern: &str) -> EngineResult<Self> {
        Ok(Self {
            path: path.into(),
            pattern: Regex::new(pattern)?,
            offset: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Current file length; a missing file has length zero
    fn len(&self) -> EngineResult<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

impl LogSource for FileLogTail {
    fn checkpoint(&mut self) -> EngineResult<()> {
        self.offset = self.len()?;
        trace!("Log checkpoint at byte {}", self.offset);
        Ok(())
    }

    fn new_error_lines(&mut self) -> EngineResult<Vec<String>> {
        let len = self.len()?;
        if len < self.offset {
            debug!("Engine log shrank, reading from the start");
            self.offset = 0;
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        file.seek(SeekFrom::Start(self.offset))
            .map_err(|e| self.io_error(e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| self.io_error(e))?;
        self.offset += bytes.len() as u64;

        let text = String::from_utf8_lossy(&bytes);
        Ok(text
            .lines()
            .filter(|line| self.pattern.is_match(line))
            .map(|line| line.trim_end().to_string())
            .collect())
    }
}

/// [`LogSource`] for environments without an engine log
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLog;

impl LogSource for NoLog {
    fn checkpoint(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn new_error_lines(&mut self) -> EngineResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::TempDir;

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn test_only_new_matching_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Engine.log");
        append(&path, "old error line\n");

        let mut tail = FileLogTail::new(&path, "(?i)error").unwrap();
        tail.checkpoint().unwrap();
        append(&path, "Execute macro started\nAction failed with Error 7\n");

        assert_eq!(tail.new_error_lines().unwrap(), vec!["Action failed with Error 7"]);
        assert!(tail.new_error_lines().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_has_no_lines() {
        let dir = TempDir::new().unwrap();
        let mut tail = FileLogTail::new(dir.path().join("absent.log"), "error").unwrap();
        tail.checkpoint().unwrap();
        assert!(tail.new_error_lines().unwrap().is_empty());
    }

    #[test]
    fn test_truncated_log_reads_from_start() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Engine.log");
        append(&path, "a long line that will be rotated away\n");

        let mut tail = FileLogTail::new(&path, "error").unwrap();
        tail.checkpoint().unwrap();
        std::fs::write(&path, "error\n").unwrap();

        assert_eq!(tail.new_error_lines().unwrap(), vec!["error"]);
    }

    #[test]
    fn test_bad_pattern() {
        assert!(matches!(
            FileLogTail::new("/tmp/x.log", "(unclosed"),
            Err(EngineError::InvalidPattern(_))
        ));
    }
}
