//! Mock extractor for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::extractor::{ExtractError, Extractor, MediaInfo, MediaStream, StreamKind};
use crate::resolver::MediaId;

/// Mock implementation of the Extractor trait.
///
/// Provides controllable behavior for testing:
/// - Configure the reported title and per-stream chunks
/// - Slow down metadata or either stream independently
/// - Fail metadata once, or fail a stream part way through
/// - Track which streams were opened and which ran to completion
#[derive(Debug, Clone)]
pub struct MockExtractor {
    title: Arc<RwLock<String>>,
    chunks: Arc<RwLock<HashMap<StreamKind, Vec<Bytes>>>>,
    chunk_delays: Arc<RwLock<HashMap<StreamKind, Duration>>>,
    info_delay: Arc<RwLock<Duration>>,
    /// If set, the next fetch_info fails with this error.
    info_error: Arc<RwLock<Option<ExtractError>>>,
    /// Stream kind -> number of chunks yielded before failing.
    fail_after: Arc<RwLock<HashMap<StreamKind, usize>>>,
    reject_ids: Arc<AtomicBool>,
    info_calls: Arc<RwLock<Vec<MediaId>>>,
    opened: Arc<RwLock<Vec<StreamKind>>>,
    completed: Arc<RwLock<Vec<StreamKind>>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    /// Create a mock reporting "Test Video" with small video and audio streams.
    pub fn new() -> Self {
        let mut chunks = HashMap::new();
        chunks.insert(
            StreamKind::VideoOnly,
            vec![Bytes::from_static(b"VID"), Bytes::from_static(b"EO")],
        );
        chunks.insert(StreamKind::AudioOnly, vec![Bytes::from_static(b"AUDIO")]);

        Self {
            title: Arc::new(RwLock::new("Test Video".to_string())),
            chunks: Arc::new(RwLock::new(chunks)),
            chunk_delays: Arc::new(RwLock::new(HashMap::new())),
            info_delay: Arc::new(RwLock::new(Duration::ZERO)),
            info_error: Arc::new(RwLock::new(None)),
            fail_after: Arc::new(RwLock::new(HashMap::new())),
            reject_ids: Arc::new(AtomicBool::new(false)),
            info_calls: Arc::new(RwLock::new(Vec::new())),
            opened: Arc::new(RwLock::new(Vec::new())),
            completed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the title reported by fetch_info.
    pub async fn set_title(&self, title: impl Into<String>) {
        *self.title.write().await = title.into();
    }

    /// Set the chunks yielded for one stream kind.
    pub async fn set_chunks(&self, kind: StreamKind, chunks: Vec<Bytes>) {
        self.chunks.write().await.insert(kind, chunks);
    }

    /// Delay applied before each chunk of one stream kind.
    pub async fn set_chunk_delay(&self, kind: StreamKind, delay: Duration) {
        self.chunk_delays.write().await.insert(kind, delay);
    }

    /// Delay applied before fetch_info returns.
    pub async fn set_info_delay(&self, delay: Duration) {
        *self.info_delay.write().await = delay;
    }

    /// Configure the next fetch_info to fail with the given error.
    pub async fn set_info_error(&self, error: ExtractError) {
        *self.info_error.write().await = Some(error);
    }

    /// Configure the next fetch_info to fail as if the tool printed `message`.
    pub async fn fail_info_with_message(&self, message: &str) {
        self.set_info_error(ExtractError::classify(message)).await;
    }

    /// Make one stream kind fail after yielding `after` chunks.
    pub async fn fail_stream_after(&self, kind: StreamKind, after: usize) {
        self.fail_after.write().await.insert(kind, after);
    }

    /// Reject every identifier in validate_id.
    pub fn set_reject_ids(&self, reject: bool) {
        self.reject_ids.store(reject, Ordering::SeqCst);
    }

    /// Identifiers passed to fetch_info.
    pub async fn info_calls(&self) -> Vec<MediaId> {
        self.info_calls.read().await.clone()
    }

    /// Stream kinds opened, in order.
    pub async fn opened_streams(&self) -> Vec<StreamKind> {
        self.opened.read().await.clone()
    }

    /// Stream kinds that yielded every chunk, in completion order.
    pub async fn completed_streams(&self) -> Vec<StreamKind> {
        self.completed.read().await.clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    fn validate_id(&self, id: &MediaId) -> bool {
        !self.reject_ids.load(Ordering::SeqCst) && crate::resolver::is_valid_id(id.as_str())
    }

    async fn fetch_info(&self, id: &MediaId) -> Result<MediaInfo, ExtractError> {
        self.info_calls.write().await.push(id.clone());

        let delay = *self.info_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.info_error.write().await.take() {
            return Err(err);
        }

        Ok(MediaInfo {
            id: id.clone(),
            title: self.title.read().await.clone(),
            duration_secs: Some(212.0),
            uploader: Some("Mock Channel".to_string()),
        })
    }

    async fn open_stream(
        &self,
        _id: &MediaId,
        kind: StreamKind,
    ) -> Result<MediaStream, ExtractError> {
        self.opened.write().await.push(kind);

        let chunks = self.chunks.read().await.get(&kind).cloned().unwrap_or_default();
        let delay = self
            .chunk_delays
            .read()
            .await
            .get(&kind)
            .copied()
            .unwrap_or(Duration::ZERO);
        let fail_after = self.fail_after.read().await.get(&kind).copied();

        let mut items: Vec<Result<Bytes, ExtractError>> = chunks.into_iter().map(Ok).collect();
        if let Some(n) = fail_after {
            items.truncate(n);
            items.push(Err(ExtractError::fetch(format!(
                "ERROR: {} stream interrupted",
                kind
            ))));
        }

        let body = stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });

        let completed = Arc::clone(&self.completed);
        let tail = stream::once(async move {
            completed.write().await.push(kind);
            None
        })
        .filter_map(futures::future::ready);

        Ok(body.chain(tail).boxed())
    }

    async fn validate(&self) -> Result<(), ExtractError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> MediaId {
        MediaId::parse("dQw4w9WgXcQ").unwrap()
    }

    async fn collect(stream: MediaStream) -> Vec<Result<Bytes, ExtractError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_default_info_and_streams() {
        let extractor = MockExtractor::new();

        let info = extractor.fetch_info(&id()).await.unwrap();
        assert_eq!(info.title, "Test Video");

        let video = extractor.open_stream(&id(), StreamKind::VideoOnly).await.unwrap();
        let items = collect(video).await;
        assert_eq!(items.len(), 2);

        assert_eq!(extractor.info_calls().await, vec![id()]);
        assert_eq!(extractor.opened_streams().await, vec![StreamKind::VideoOnly]);
        assert_eq!(extractor.completed_streams().await, vec![StreamKind::VideoOnly]);
    }

    #[tokio::test]
    async fn test_info_error_is_one_shot() {
        let extractor = MockExtractor::new();
        extractor.fail_info_with_message("ERROR: Video unavailable").await;

        let err = extractor.fetch_info(&id()).await.unwrap_err();
        assert!(matches!(err, ExtractError::Unavailable { .. }));
        assert!(extractor.fetch_info(&id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_stream_failure_after_chunks() {
        let extractor = MockExtractor::new();
        extractor.fail_stream_after(StreamKind::VideoOnly, 1).await;

        let video = extractor.open_stream(&id(), StreamKind::VideoOnly).await.unwrap();
        let items = collect(video).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_dropped_stream_is_not_completed() {
        let extractor = MockExtractor::new();
        let mut audio = extractor.open_stream(&id(), StreamKind::AudioOnly).await.unwrap();
        audio.next().await;
        drop(audio);

        assert!(extractor.completed_streams().await.is_empty());
    }

    #[test]
    fn test_reject_ids() {
        let extractor = MockExtractor::new();
        assert!(extractor.validate_id(&id()));
        extractor.set_reject_ids(true);
        assert!(!extractor.validate_id(&id()));
    }
}
