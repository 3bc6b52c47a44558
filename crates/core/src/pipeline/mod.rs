//! Pipeline coordinator: resolve → materialize → mux → deliver → clean up.
//!
//! Each call to [`Pipeline::run`] is an independent instance with no shared
//! mutable state. The coordinator owns the request's [`ArtifactSet`] from
//! the moment materialization starts; every early return drops it, which
//! sweeps whatever was written. On success the set moves into the
//! [`Delivery`] and is swept once the response body is gone.

mod delivery;
mod error;
mod stage;

pub use delivery::{Delivery, DeliveryStream};
pub use error::{ErrorKind, PipelineError};
pub use stage::PipelineStage;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, field, info, info_span, Instrument, Span};

use crate::artifacts::ArtifactSet;
use crate::config::{Config, StorageConfig};
use crate::extractor::Extractor;
use crate::materializer::Materializer;
use crate::metrics::{PIPELINE_RUNS, STAGE_DURATION};
use crate::muxer::{mux_and_release, MuxJob, Muxer};
use crate::resolver::{resolve, MediaId, ResolveError};

/// Settings the coordinator needs from the full configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub storage: StorageConfig,
    pub metadata_timeout: Duration,
    pub download_timeout: Duration,
    pub mux_timeout: Duration,
    pub video_codec: String,
    pub audio_codec: String,
}

impl PipelineConfig {
    /// Default deadlines and codecs with the given storage roots.
    pub fn new(storage: StorageConfig) -> Self {
        let defaults = Config::default();
        Self {
            storage,
            ..Self::from(&defaults)
        }
    }

    pub fn with_timeouts(mut self, metadata: Duration, download: Duration, mux: Duration) -> Self {
        self.metadata_timeout = metadata;
        self.download_timeout = download;
        self.mux_timeout = mux;
        self
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            storage: config.storage.clone(),
            metadata_timeout: Duration::from_secs(config.extractor.metadata_timeout_secs),
            download_timeout: Duration::from_secs(config.extractor.download_timeout_secs),
            mux_timeout: Duration::from_secs(config.muxer.timeout_secs),
            video_codec: config.muxer.video_codec.clone(),
            audio_codec: config.muxer.audio_codec.clone(),
        }
    }
}

/// Sequences the stages for one request at a time; cheap to share.
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Arc<dyn Extractor>,
    muxer: Arc<dyn Muxer>,
    materializer: Materializer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, extractor: Arc<dyn Extractor>, muxer: Arc<dyn Muxer>) -> Self {
        let materializer = Materializer::new(
            Arc::clone(&extractor),
            config.metadata_timeout,
            config.download_timeout,
        );
        Self {
            config,
            extractor,
            muxer,
            materializer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    pub fn muxer(&self) -> &dyn Muxer {
        self.muxer.as_ref()
    }

    /// Runs one request to a terminal outcome. Never retries.
    pub async fn run(&self, raw_url: &str) -> Result<Delivery, PipelineError> {
        let span = info_span!("pipeline", request_id = field::Empty, media_id = field::Empty);
        let started = Instant::now();

        let result = self.execute(raw_url).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        PIPELINE_RUNS.with_label_values(&[outcome]).inc();

        match &result {
            Ok(delivery) => info!(
                media_id = %delivery.media_id,
                size_bytes = delivery.size_bytes,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Pipeline ready to deliver"
            ),
            Err(e) => error!(
                kind = e.kind().as_str(),
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Pipeline failed"
            ),
        }

        result
    }

    async fn execute(&self, raw_url: &str) -> Result<Delivery, PipelineError> {
        let id = timed(PipelineStage::Resolving, async { self.resolve(raw_url) }).await?;
        Span::current().record("media_id", field::display(&id));
        info!(raw_url, media_id = %id, url = %id.watch_url(), "Resolved media identifier");

        let mut artifacts = ArtifactSet::new(&self.config.storage);
        Span::current().record("request_id", field::display(artifacts.request_id()));

        let materialized = timed(
            PipelineStage::Materializing,
            self.materializer.materialize(&id, &mut artifacts),
        )
        .await?;

        let output_path = artifacts.output_path(&materialized.title);
        let job = MuxJob::new(materialized.video_path, materialized.audio_path, output_path)
            .with_codecs(&self.config.video_codec, &self.config.audio_codec);

        let output = timed(PipelineStage::Muxing, async {
            mux_and_release(self.muxer.as_ref(), &job, self.config.mux_timeout)
                .await
                .map_err(PipelineError::from)
        })
        .await?;

        Ok(Delivery::new(
            id,
            materialized.title,
            output.output_path,
            output.size_bytes,
            artifacts,
        ))
    }

    fn resolve(&self, raw_url: &str) -> Result<MediaId, PipelineError> {
        let id = resolve(raw_url)?;
        if !self.extractor.validate_id(&id) {
            return Err(ResolveError::NoIdentifier.into());
        }
        Ok(id)
    }
}

/// Awaits one stage and records its duration.
async fn timed<T, F>(stage: PipelineStage, fut: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    let started = Instant::now();
    let result = fut.await;
    let label = if result.is_ok() { "ok" } else { "error" };
    STAGE_DURATION
        .with_label_values(&[stage.as_str(), label])
        .observe(started.elapsed().as_secs_f64());
    result
}
