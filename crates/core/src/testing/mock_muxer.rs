//! Mock muxer for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::muxer::{MuxError, MuxJob, MuxOutput, Muxer};

/// A recorded mux job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedMux {
    /// The job that was submitted.
    pub job: MuxJob,
    /// Size of the video input when the mux started, if it existed.
    pub video_bytes_at_start: Option<u64>,
    /// Size of the audio input when the mux started, if it existed.
    pub audio_bytes_at_start: Option<u64>,
    /// Whether the mux succeeded.
    pub success: bool,
}

/// Mock implementation of the Muxer trait.
///
/// Provides controllable behavior for testing:
/// - Track mux jobs (and the input sizes seen) for assertions
/// - Simulate success by writing the concatenated inputs as output
/// - Simulate failure, optionally after leaving a partial output behind
/// - Simulate a slow process
///
/// # Example
///
/// ```rust,ignore
/// use tubemux_core::testing::MockMuxer;
///
/// let muxer = MockMuxer::new();
/// muxer.set_next_error(MuxError::failed("exit 1", None)).await;
///
/// let result = muxer.mux(&job).await;
/// assert!(result.is_err());
/// assert_eq!(muxer.mux_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockMuxer {
    /// Recorded jobs.
    jobs: Arc<RwLock<Vec<RecordedMux>>>,
    /// If set, the next mux will fail with this error.
    next_error: Arc<RwLock<Option<MuxError>>>,
    /// Simulated process duration.
    delay: Arc<RwLock<Duration>>,
    /// Write a partial output before failing.
    write_partial_output: Arc<RwLock<bool>>,
}

impl Default for MockMuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMuxer {
    /// Create a new mock muxer.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            write_partial_output: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded jobs.
    pub async fn recorded_jobs(&self) -> Vec<RecordedMux> {
        self.jobs.read().await.clone()
    }

    /// Get the number of mux invocations.
    pub async fn mux_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Configure the next mux to fail with the given error.
    pub async fn set_next_error(&self, error: MuxError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated process duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Leave a partial output file behind when failing.
    pub async fn set_write_partial_output(&self, write: bool) {
        *self.write_partial_output.write().await = write;
    }

    async fn size_of(path: &Path) -> Option<u64> {
        tokio::fs::metadata(path).await.ok().map(|m| m.len())
    }
}

#[async_trait]
impl Muxer for MockMuxer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn mux(&self, job: &MuxJob) -> Result<MuxOutput, MuxError> {
        let start = Instant::now();
        let video_bytes_at_start = Self::size_of(&job.video_path).await;
        let audio_bytes_at_start = Self::size_of(&job.audio_path).await;

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut record = RecordedMux {
            job: job.clone(),
            video_bytes_at_start,
            audio_bytes_at_start,
            success: false,
        };

        if let Some(err) = self.next_error.write().await.take() {
            if *self.write_partial_output.read().await {
                tokio::fs::write(&job.output_path, b"partial").await?;
            }
            self.jobs.write().await.push(record);
            return Err(err);
        }

        let mut output = tokio::fs::read(&job.video_path).await.map_err(|_| {
            MuxError::InputNotFound {
                path: job.video_path.clone(),
            }
        })?;
        let audio = tokio::fs::read(&job.audio_path).await.map_err(|_| {
            MuxError::InputNotFound {
                path: job.audio_path.clone(),
            }
        })?;
        output.extend_from_slice(&audio);
        tokio::fs::write(&job.output_path, &output).await?;

        record.success = true;
        self.jobs.write().await.push(record);

        Ok(MuxOutput {
            output_path: job.output_path.clone(),
            size_bytes: output.len() as u64,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), MuxError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staged_job(dir: &TempDir) -> MuxJob {
        let video = dir.path().join("v.mp4");
        let audio = dir.path().join("a.mp4");
        std::fs::write(&video, b"VV").unwrap();
        std::fs::write(&audio, b"AAA").unwrap();
        MuxJob::new(video, audio, dir.path().join("out.mp4"))
    }

    #[tokio::test]
    async fn test_success_concatenates_inputs() {
        let dir = TempDir::new().unwrap();
        let job = staged_job(&dir);
        let muxer = MockMuxer::new();

        let output = muxer.mux(&job).await.unwrap();

        assert_eq!(output.size_bytes, 5);
        assert_eq!(std::fs::read(&job.output_path).unwrap(), b"VVAAA");
        let jobs = muxer.recorded_jobs().await;
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].success);
        assert_eq!(jobs[0].video_bytes_at_start, Some(2));
        assert_eq!(jobs[0].audio_bytes_at_start, Some(3));
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let dir = TempDir::new().unwrap();
        let job = staged_job(&dir);
        let muxer = MockMuxer::new();
        muxer.set_next_error(MuxError::failed("boom", None)).await;

        assert!(muxer.mux(&job).await.is_err());
        assert!(!job.output_path.exists());
        assert!(muxer.mux(&job).await.is_ok());

        let jobs = muxer.recorded_jobs().await;
        assert!(!jobs[0].success);
        assert!(jobs[1].success);
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let muxer = MockMuxer::new();
        let job = MuxJob::new(
            dir.path().join("nope.mp4"),
            dir.path().join("nope2.mp4"),
            dir.path().join("out.mp4"),
        );

        let err = muxer.mux(&job).await.unwrap_err();
        assert!(matches!(err, MuxError::InputNotFound { .. }));
    }
}
