//! Error types for the pipeline.

use std::time::Duration;
use thiserror::Error;

use super::stage::PipelineStage;
use crate::extractor::ExtractError;
use crate::muxer::MuxError;
use crate::resolver::ResolveError;

/// Coarse classification of a pipeline failure, used for response mapping
/// and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    Unavailable,
    MetadataFailure,
    FetchFailed,
    MuxFailed,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Unavailable => "unavailable",
            Self::MetadataFailure => "metadata_failure",
            Self::FetchFailed => "fetch_failed",
            Self::MuxFailed => "mux_failed",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        }
    }
}

/// Terminal failure of one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ResolveError),

    #[error("Media unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Metadata extraction failed: {reason}")]
    MetadataFailure { reason: String },

    #[error("Fetching media failed: {0}")]
    FetchFailed(#[source] ExtractError),

    #[error("Mux failed: {0}")]
    MuxFailed(#[source] MuxError),

    #[error("{stage} stage timed out after {timeout:?}")]
    Timeout {
        stage: PipelineStage,
        timeout: Duration,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::MetadataFailure { .. } => ErrorKind::MetadataFailure,
            Self::FetchFailed(_) => ErrorKind::FetchFailed,
            Self::MuxFailed(_) => ErrorKind::MuxFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show to the caller. Diagnostic detail stays in logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidUrl(ResolveError::Empty) => "No URL provided",
            Self::InvalidUrl(_) => "Invalid YouTube URL",
            Self::Unavailable { .. } => "This video is unavailable or restricted.",
            Self::MetadataFailure { .. } => {
                "Could not extract video metadata. Try another video."
            }
            Self::FetchFailed(_) => {
                "Error fetching video info. The video may be restricted or blocked."
            }
            Self::MuxFailed(_) => "Error processing video",
            Self::Timeout { .. } => "Timed out while processing video",
            Self::Io(_) => "Internal server error",
        }
    }

    pub(crate) fn timeout(stage: PipelineStage, timeout: Duration) -> Self {
        Self::Timeout {
            stage,
            timeout,
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unavailable { reason } => Self::Unavailable { reason },
            ExtractError::MetadataFailure { reason } => Self::MetadataFailure { reason },
            other => Self::FetchFailed(other),
        }
    }
}

impl From<MuxError> for PipelineError {
    fn from(err: MuxError) -> Self {
        match err {
            MuxError::Timeout { timeout } => Self::timeout(PipelineStage::Muxing, timeout),
            other => Self::MuxFailed(other),
        }
    }
}
