use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tubemux_core::{
    load_config, load_default_config, validate_config, Config, ConfigError, Extractor,
    FfmpegMuxer, LogFormat, Muxer, Pipeline, PipelineConfig, YtDlpExtractor,
};
use tubemux_server::{api::create_router, state::AppState};

/// Default config file, read only if present.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = read_config();

    // Initialize logging; a broken config still gets reported through it
    init_tracing(
        config
            .as_ref()
            .map(|c| c.logging.format)
            .unwrap_or_default(),
    );

    let config = config.context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Temp directory: {:?}", config.storage.temp_dir);
    info!("Downloads directory: {:?}", config.storage.downloads_dir);

    // External tools
    let extractor = YtDlpExtractor::new(config.extractor.clone());
    let muxer = FfmpegMuxer::new(config.muxer.clone());

    match extractor.validate().await {
        Ok(()) => info!("Using extractor: {}", extractor.name()),
        Err(e) => warn!(error = %e, "Extractor unavailable; downloads will fail until it is installed"),
    }
    match muxer.validate().await {
        Ok(()) => info!("Using muxer: {}", muxer.name()),
        Err(e) => warn!(error = %e, "Muxer unavailable; downloads will fail until it is installed"),
    }

    tokio::fs::create_dir_all(&config.storage.downloads_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create downloads directory {:?}",
                config.storage.downloads_dir
            )
        })?;

    let pipeline = Arc::new(Pipeline::new(
        PipelineConfig::from(&config),
        Arc::new(extractor),
        Arc::new(muxer),
    ));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), pipeline));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Reads `TUBEMUX_CONFIG` if set (the file must exist), otherwise the
/// optional default file.
fn read_config() -> Result<Config, ConfigError> {
    match std::env::var("TUBEMUX_CONFIG") {
        Ok(path) => load_config(&PathBuf::from(path)),
        Err(_) => load_default_config(&PathBuf::from(DEFAULT_CONFIG_PATH)),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
