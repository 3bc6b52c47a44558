//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the extraction boundary, already classified.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The media exists but cannot be accessed (removed, private, region locked).
    #[error("Media unavailable: {reason}")]
    Unavailable { reason: String },

    /// Metadata for the media could not be read.
    #[error("Failed to extract metadata: {reason}")]
    MetadataFailure { reason: String },

    /// Any other retrieval failure.
    #[error("Fetch failed: {reason}")]
    Fetch { reason: String },

    /// The extraction tool is not installed where configured.
    #[error("Extraction tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// I/O error while talking to the tool or reading a stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::Fetch {
            reason: reason.into(),
        }
    }

    pub fn metadata(reason: impl Into<String>) -> Self {
        Self::MetadataFailure {
            reason: reason.into(),
        }
    }

    /// Classifies a diagnostic message reported by the extraction tool.
    ///
    /// This is the only place free text is inspected; everything downstream
    /// matches on the variant.
    pub fn classify(message: &str) -> Self {
        let reason = summary_line(message);
        let lower = message.to_lowercase();

        if [
            "video unavailable",
            "this video is unavailable",
            "this video is not available",
            "private video",
            "has been removed",
        ]
        .iter()
        .any(|needle| lower.contains(needle))
        {
            return Self::Unavailable { reason };
        }

        if [
            "unable to extract",
            "failed to extract",
            "could not extract",
        ]
        .iter()
        .any(|needle| lower.contains(needle))
        {
            return Self::MetadataFailure { reason };
        }

        Self::Fetch { reason }
    }
}

/// Picks the line that best describes a failure: the last `ERROR:` line,
/// else the last non-empty line.
fn summary_line(message: &str) -> String {
    let lines: Vec<&str> = message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "no diagnostic output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unavailable() {
        let err = ExtractError::classify("ERROR: [youtube] abc: This video is unavailable");
        assert!(matches!(err, ExtractError::Unavailable { .. }));

        let err = ExtractError::classify("ERROR: [youtube] abc: Private video. Sign in");
        assert!(matches!(err, ExtractError::Unavailable { .. }));
    }

    #[test]
    fn test_classify_metadata_failure() {
        let err = ExtractError::classify("ERROR: Unable to extract initial player response");
        assert!(matches!(err, ExtractError::MetadataFailure { .. }));

        let err = ExtractError::classify("Could not extract video metadata");
        assert!(matches!(err, ExtractError::MetadataFailure { .. }));
    }

    #[test]
    fn test_classify_other() {
        let err = ExtractError::classify("ERROR: HTTP Error 403: Forbidden");
        assert!(matches!(err, ExtractError::Fetch { .. }));
    }

    #[test]
    fn test_reason_is_last_error_line() {
        let stderr = "WARNING: falling back\nERROR: first\n[debug] noise\nERROR: HTTP Error 429\n";
        match ExtractError::classify(stderr) {
            ExtractError::Fetch { reason } => assert_eq!(reason, "ERROR: HTTP Error 429"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_reason_for_empty_output() {
        match ExtractError::classify("") {
            ExtractError::Fetch { reason } => assert_eq!(reason, "no diagnostic output"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
