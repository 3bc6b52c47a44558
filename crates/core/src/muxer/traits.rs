//! Trait definitions for the muxer module.

use async_trait::async_trait;

use super::error::MuxError;
use super::types::{MuxJob, MuxOutput};

/// Combines a video-only and an audio-only file into one container.
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Returns the name of this muxer implementation.
    fn name(&self) -> &str;

    /// Runs one mux. Emits exactly one terminal outcome; never retries.
    ///
    /// Dropping the returned future aborts the underlying process.
    async fn mux(&self, job: &MuxJob) -> Result<MuxOutput, MuxError>;

    /// Validates that the muxer is properly configured and ready.
    async fn validate(&self) -> Result<(), MuxError>;
}
