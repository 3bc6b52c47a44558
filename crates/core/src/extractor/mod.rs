//! Extraction capability: media identifier in, metadata and byte streams out.
//!
//! The `Extractor` trait is the seam between the pipeline and whatever
//! actually talks to the video platform. `YtDlpExtractor` drives the `yt-dlp`
//! binary; tests use `testing::MockExtractor`.

mod error;
mod traits;
mod types;
mod ytdlp;

pub use error::ExtractError;
pub use traits::Extractor;
pub use types::{MediaInfo, MediaStream, StreamKind};
pub use ytdlp::YtDlpExtractor;
