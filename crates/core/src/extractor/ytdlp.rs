//! yt-dlp based extractor implementation.

use async_trait::async_trait;
use futures::{future, stream, StreamExt};
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::error::ExtractError;
use super::traits::Extractor;
use super::types::{MediaInfo, MediaStream, StreamKind};
use crate::config::ExtractorConfig;
use crate::resolver::MediaId;

/// Extractor that shells out to the `yt-dlp` binary.
pub struct YtDlpExtractor {
    config: ExtractorConfig,
}

impl YtDlpExtractor {
    /// Creates a new extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Creates an extractor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// Builds yt-dlp arguments for the metadata request.
    fn build_info_args(&self, id: &MediaId) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--user-agent".to_string(),
            self.config.user_agent.clone(),
            "--add-header".to_string(),
            format!("Accept-Language:{}", self.config.accept_language),
            id.watch_url(),
        ]
    }

    /// Builds yt-dlp arguments that write one elementary stream to stdout.
    fn build_stream_args(&self, id: &MediaId, kind: StreamKind) -> Vec<String> {
        let format = match kind {
            StreamKind::VideoOnly => "bestvideo[ext=mp4]/bestvideo",
            StreamKind::AudioOnly => "bestaudio[ext=m4a]/bestaudio",
        };

        vec![
            "--format".to_string(),
            format.to_string(),
            "--no-playlist".to_string(),
            "--no-part".to_string(),
            "--quiet".to_string(),
            "--no-progress".to_string(),
            "--user-agent".to_string(),
            self.config.user_agent.clone(),
            "--add-header".to_string(),
            format!("Accept-Language:{}", self.config.accept_language),
            "--output".to_string(),
            "-".to_string(),
            id.watch_url(),
        ]
    }

    /// Parses `--dump-single-json` output into MediaInfo.
    fn parse_info_output(id: &MediaId, output: &str) -> Result<MediaInfo, ExtractError> {
        #[derive(Deserialize)]
        struct InfoOutput {
            title: Option<String>,
            duration: Option<f64>,
            uploader: Option<String>,
        }

        let info: InfoOutput = serde_json::from_str(output)
            .map_err(|e| ExtractError::metadata(format!("Failed to parse yt-dlp output: {}", e)))?;

        let title = info
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ExtractError::metadata("yt-dlp reported no title"))?;

        Ok(MediaInfo {
            id: id.clone(),
            title,
            duration_secs: info.duration,
            uploader: info.uploader,
        })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.ytdlp_path);
        command.stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> ExtractError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractError::ToolNotFound {
                path: self.config.ytdlp_path.clone(),
            }
        } else {
            ExtractError::Io(e)
        }
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_info(&self, id: &MediaId) -> Result<MediaInfo, ExtractError> {
        let output = self
            .command()
            .args(self.build_info_args(id))
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ExtractError::classify(&String::from_utf8_lossy(
                &output.stderr,
            )));
        }

        Self::parse_info_output(id, &String::from_utf8_lossy(&output.stdout))
    }

    async fn open_stream(
        &self,
        id: &MediaId,
        kind: StreamKind,
    ) -> Result<MediaStream, ExtractError> {
        let mut child = self
            .command()
            .args(self.build_stream_args(id, kind))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractError::fetch("yt-dlp stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractError::fetch("yt-dlp stderr was not captured"))?;

        // Drained on its own so a chatty stderr never blocks stdout.
        let stderr_task = tokio::spawn(async move { read_lossy(&mut stderr).await });

        debug!(media_id = %id, stream = %kind, "yt-dlp stream opened");

        let body = ReaderStream::new(stdout).map(|chunk| chunk.map_err(ExtractError::Io));

        // Surfaces a non-zero exit as the final item of the stream.
        let exit = stream::once(async move {
            let status = match child.wait().await {
                Ok(status) => status,
                Err(e) => return Some(Err(ExtractError::Io(e))),
            };
            let stderr = stderr_task.await.unwrap_or_default();
            if status.success() {
                None
            } else {
                Some(Err(ExtractError::classify(&stderr)))
            }
        })
        .filter_map(future::ready);

        Ok(body.chain(exit).boxed())
    }

    async fn validate(&self) -> Result<(), ExtractError> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ExtractError::fetch("yt-dlp --version failed"));
        }

        debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "yt-dlp available"
        );
        Ok(())
    }
}

/// Reads a child pipe to the end. Invalid UTF-8 is replaced rather than
/// discarding the whole output.
async fn read_lossy<R: AsyncRead + Unpin>(reader: &mut R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!(error = %e, "Failed to read yt-dlp stderr");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
