pub mod artifacts;
pub mod config;
pub mod extractor;
pub mod materializer;
pub mod metrics;
pub mod muxer;
pub mod pipeline;
pub mod resolver;
pub mod testing;

pub use artifacts::ArtifactSet;
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
    LogFormat,
};
pub use extractor::{ExtractError, Extractor, MediaInfo, StreamKind, YtDlpExtractor};
pub use materializer::{MediaTitle, Materializer};
pub use muxer::{FfmpegMuxer, MuxError, MuxJob, MuxOutput, Muxer};
pub use pipeline::{
    Delivery, DeliveryStream, ErrorKind, Pipeline, PipelineConfig, PipelineError, PipelineStage,
};
pub use resolver::{resolve, MediaId, ResolveError};
