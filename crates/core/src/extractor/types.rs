//! Types for the extractor module.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ExtractError;
use crate::resolver::MediaId;

/// A remote byte stream of one elementary stream.
pub type MediaStream = BoxStream<'static, Result<Bytes, ExtractError>>;

/// Which elementary stream to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    VideoOnly,
    AudioOnly,
}

impl StreamKind {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VideoOnly => "video",
            Self::AudioOnly => "audio",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata reported for one media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: MediaId,
    /// Title as reported, not yet sanitized.
    pub title: String,
    pub duration_secs: Option<f64>,
    pub uploader: Option<String>,
}
