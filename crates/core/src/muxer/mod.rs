//! Mux orchestration: combine the two materialized streams into one MP4.
//!
//! The `Muxer` trait abstracts the external process; `FfmpegMuxer` runs the
//! `ffmpeg` binary. [`mux_and_release`] is the pipeline step around it: one
//! invocation under a deadline, after which the two input files are removed
//! whatever the outcome.

mod error;
mod ffmpeg;
mod traits;
mod types;

pub use error::MuxError;
pub use ffmpeg::FfmpegMuxer;
pub use traits::Muxer;
pub use types::{MuxJob, MuxOutput, CODEC_COPY};

use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::artifacts::remove_file_quietly;

/// Runs `job` once and releases its inputs.
///
/// On success the inputs are removed before returning, freeing disk before
/// the (larger) output is served. On failure the inputs and any partial
/// output are removed; the output is never assumed to exist.
pub async fn mux_and_release(
    muxer: &dyn Muxer,
    job: &MuxJob,
    deadline: Duration,
) -> Result<MuxOutput, MuxError> {
    let result = match timeout(deadline, muxer.mux(job)).await {
        Ok(result) => result,
        Err(_) => Err(MuxError::Timeout {
            timeout: deadline,
        }),
    };

    remove_file_quietly(&job.video_path).await;
    remove_file_quietly(&job.audio_path).await;

    match &result {
        Ok(output) => info!(
            muxer = muxer.name(),
            size_bytes = output.size_bytes,
            duration_ms = output.duration_ms,
            "Mux completed"
        ),
        Err(e) => {
            warn!(
                muxer = muxer.name(),
                error = %e,
                diagnostics = e.diagnostics().unwrap_or(""),
                "Mux failed"
            );
            remove_file_quietly(&job.output_path).await;
        }
    }

    result
}
