//! Trait definitions for the extractor module.

use async_trait::async_trait;

use super::error::ExtractError;
use super::types::{MediaInfo, MediaStream, StreamKind};
use crate::resolver::{is_valid_id, MediaId};

/// Turns a media identifier into metadata and elementary byte streams.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Stricter identifier check applied before any network access.
    fn validate_id(&self, id: &MediaId) -> bool {
        is_valid_id(id.as_str())
    }

    /// Fetches metadata for the media (one network round trip).
    async fn fetch_info(&self, id: &MediaId) -> Result<MediaInfo, ExtractError>;

    /// Opens a stream filtered to one kind of content.
    ///
    /// Dropping the stream before it ends aborts the retrieval.
    async fn open_stream(&self, id: &MediaId, kind: StreamKind)
        -> Result<MediaStream, ExtractError>;

    /// Validates that the extractor is properly configured and ready.
    async fn validate(&self) -> Result<(), ExtractError>;
}
