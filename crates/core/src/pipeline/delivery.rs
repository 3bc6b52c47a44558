//! The successful outcome of a pipeline run and the stream that serves it.

use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use super::stage::PipelineStage;
use crate::artifacts::ArtifactSet;
use crate::materializer::MediaTitle;
use crate::metrics::STAGE_DURATION;
use crate::resolver::MediaId;

/// A muxed file ready to be sent. Owns the request's artifacts: dropping the
/// delivery (or the stream made from it) removes the file.
#[derive(Debug)]
pub struct Delivery {
    pub media_id: MediaId,
    pub title: MediaTitle,
    pub path: PathBuf,
    pub size_bytes: u64,
    artifacts: ArtifactSet,
}

impl Delivery {
    pub(crate) fn new(
        media_id: MediaId,
        title: MediaTitle,
        path: PathBuf,
        size_bytes: u64,
        artifacts: ArtifactSet,
    ) -> Self {
        Self {
            media_id,
            title,
            path,
            size_bytes,
            artifacts,
        }
    }

    /// Name offered to the caller for the download.
    pub fn file_name(&self) -> String {
        format!("{}.mp4", self.title)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the output for streaming. The returned stream takes ownership of
    /// the artifacts; they are swept when it is dropped, whether or not the
    /// transfer completed. If opening fails the artifacts are swept here.
    pub async fn into_stream(self) -> io::Result<DeliveryStream> {
        let file = File::open(&self.path).await?;
        Ok(DeliveryStream {
            inner: ReaderStream::new(file),
            media_id: self.media_id,
            expected: self.size_bytes,
            sent: 0,
            started: Instant::now(),
            finished: false,
            _artifacts: self.artifacts,
        })
    }
}

/// Byte stream of a delivered file. Transfer errors are logged and passed
/// through; they never alter a response already in flight.
pub struct DeliveryStream {
    inner: ReaderStream<File>,
    media_id: MediaId,
    expected: u64,
    sent: u64,
    started: Instant,
    finished: bool,
    _artifacts: ArtifactSet,
}

impl DeliveryStream {
    pub fn bytes_sent(&self) -> u64 {
        self.sent
    }

    fn observe(&self, result: &str) {
        STAGE_DURATION
            .with_label_values(&[PipelineStage::Delivering.as_str(), result])
            .observe(self.started.elapsed().as_secs_f64());
    }
}

impl Stream for DeliveryStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                warn!(media_id = %this.media_id, sent = this.sent, error = %e, "Transfer failed");
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if !this.finished {
                    this.finished = true;
                    this.observe("ok");
                    info!(
                        media_id = %this.media_id,
                        sent = this.sent,
                        expected = this.expected,
                        "Delivery finished"
                    );
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for DeliveryStream {
    fn drop(&mut self) {
        if !self.finished {
            self.observe("error");
            warn!(
                media_id = %self.media_id,
                sent = self.sent,
                expected = self.expected,
                "Delivery aborted before completion"
            );
        }
    }
}
