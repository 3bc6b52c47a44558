//! Types for the muxer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Codec directive that copies the stream without re-encoding.
pub const CODEC_COPY: &str = "copy";

/// One mux invocation: two inputs, a codec directive pair, one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxJob {
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    pub video_codec: String,
    pub audio_codec: String,
}

impl MuxJob {
    /// Video passthrough, audio transcoded to AAC.
    pub fn new(video_path: PathBuf, audio_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            video_path,
            audio_path,
            output_path,
            video_codec: CODEC_COPY.to_string(),
            audio_codec: "aac".to_string(),
        }
    }

    pub fn with_codecs(mut self, video_codec: impl Into<String>, audio_codec: impl Into<String>) -> Self {
        self.video_codec = video_codec.into();
        self.audio_codec = audio_codec.into();
        self
    }
}

/// Result of a successful mux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxOutput {
    pub output_path: PathBuf,
    pub size_bytes: u64,
    pub duration_ms: u64,
}
