//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the external tools, so the whole pipeline (and the
//! HTTP layer on top of it) can be exercised without yt-dlp or ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubemux_core::testing::{MockExtractor, MockMuxer};
//!
//! let extractor = MockExtractor::new();
//! let muxer = MockMuxer::new();
//!
//! // Configure mock responses
//! extractor.set_title("Never Gonna Give You Up").await;
//! extractor.set_chunk_delay(StreamKind::AudioOnly, Duration::from_millis(50)).await;
//!
//! let pipeline = Pipeline::new(config, Arc::new(extractor), Arc::new(muxer));
//! ```

mod mock_extractor;
mod mock_muxer;

pub use mock_extractor::MockExtractor;
pub use mock_muxer::{MockMuxer, RecordedMux};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::StorageConfig;
    use crate::resolver::MediaId;

    /// Identifier used throughout the tests.
    pub const TEST_VIDEO_ID: &str = "dQw4w9WgXcQ";

    /// Watch URL for [`TEST_VIDEO_ID`].
    pub fn watch_url() -> String {
        format!("https://www.youtube.com/watch?v={}", TEST_VIDEO_ID)
    }

    /// Short-link URL for [`TEST_VIDEO_ID`].
    pub fn short_url() -> String {
        format!("https://youtu.be/{}", TEST_VIDEO_ID)
    }

    pub fn media_id() -> MediaId {
        MediaId::parse(TEST_VIDEO_ID).expect("fixture id is valid")
    }

    /// Storage roots under `root`, typically a `TempDir`.
    pub fn storage(root: &Path) -> StorageConfig {
        StorageConfig {
            temp_dir: root.join("tmp"),
            downloads_dir: root.join("downloads"),
        }
    }

    /// Number of entries under `dir`, recursively, counting files only.
    /// A missing directory counts as empty.
    pub fn count_files(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        entries
            .flatten()
            .map(|entry| {
                let path = entry.path();
                if path.is_dir() {
                    count_files(&path)
                } else {
                    1
                }
            })
            .sum()
    }
}
