//! Stream materializer: drains the video-only and audio-only streams of one
//! media item into local files.
//!
//! Both drains run concurrently and are joined with `try_join!`, so the
//! materializer returns only once both files are fully written and synced.
//! The first failure short-circuits the join and drops the other drain,
//! which aborts its retrieval.

mod title;

pub use title::MediaTitle;

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::artifacts::ArtifactSet;
use crate::extractor::{ExtractError, Extractor, MediaInfo, MediaStream, StreamKind};
use crate::metrics::MATERIALIZED_BYTES;
use crate::pipeline::{PipelineError, PipelineStage};
use crate::resolver::MediaId;

/// Result of a successful materialization.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub info: MediaInfo,
    pub title: MediaTitle,
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub video_bytes: u64,
    pub audio_bytes: u64,
}

/// Drains remote streams into the request's scratch directory.
pub struct Materializer {
    extractor: Arc<dyn Extractor>,
    metadata_timeout: Duration,
    download_timeout: Duration,
}

impl Materializer {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        metadata_timeout: Duration,
        download_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            metadata_timeout,
            download_timeout,
        }
    }

    /// Fetches metadata, then drains both streams into files registered with
    /// `artifacts`. Partial files are left for the artifact sweep.
    pub async fn materialize(
        &self,
        id: &MediaId,
        artifacts: &mut ArtifactSet,
    ) -> Result<Materialized, PipelineError> {
        let info = timeout(self.metadata_timeout, self.extractor.fetch_info(id))
            .await
            .map_err(|_| {
                PipelineError::timeout(PipelineStage::Materializing, self.metadata_timeout)
            })??;

        let title = MediaTitle::new(&info.title, id.as_str());
        info!(media_id = %id, title = %title, "Fetched media info");

        artifacts.prepare().await?;
        let video_path = artifacts.video_path(&title);
        let audio_path = artifacts.audio_path(&title);

        let started = Instant::now();
        let drains = async {
            tokio::try_join!(
                self.fetch_to_file(id, StreamKind::VideoOnly, &video_path),
                self.fetch_to_file(id, StreamKind::AudioOnly, &audio_path),
            )
        };
        let (video_bytes, audio_bytes) = timeout(self.download_timeout, drains)
            .await
            .map_err(|_| {
                PipelineError::timeout(PipelineStage::Materializing, self.download_timeout)
            })??;

        info!(
            media_id = %id,
            video_bytes,
            audio_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Both streams materialized"
        );

        Ok(Materialized {
            info,
            title,
            video_path,
            audio_path,
            video_bytes,
            audio_bytes,
        })
    }

    async fn fetch_to_file(
        &self,
        id: &MediaId,
        kind: StreamKind,
        path: &Path,
    ) -> Result<u64, ExtractError> {
        let stream = self.extractor.open_stream(id, kind).await?;
        let written = drain(stream, path).await?;

        MATERIALIZED_BYTES
            .with_label_values(&[kind.label()])
            .inc_by(written);
        debug!(media_id = %id, stream = %kind, bytes = written, "Stream drained");
        Ok(written)
    }
}

/// Writes every chunk of `stream` to a new file at `path`, then flushes and
/// syncs it. Returns the number of bytes written.
pub async fn drain(mut stream: MediaStream, path: &Path) -> Result<u64, ExtractError> {
    let mut file = File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
