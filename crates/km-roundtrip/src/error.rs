//! Errors raised while talking to the engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// An external process or file operation failed
#[derive(Debug, Error)]
pub enum EngineError {
    /// The process could not be started or fed its input
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully
    #[error("{program} exited with {}: {}", describe_status(.status), .stderr.trim())]
    Failed {
        program: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Reading or writing a local file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The error pattern for the engine log does not compile
    #[error("invalid log error pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}
