//! Error types for the muxer module.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while muxing.
#[derive(Debug, Error)]
pub enum MuxError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// An input file is missing.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The mux process reported failure.
    #[error("Mux failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// The process exited cleanly but left no output.
    #[error("Output file not created: {path}")]
    OutputMissing { path: PathBuf },

    /// Mux timed out.
    #[error("Mux timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// I/O error while running the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MuxError {
    /// Creates a new mux failed error with stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Diagnostic output captured from the process, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
