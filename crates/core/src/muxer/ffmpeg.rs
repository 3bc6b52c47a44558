//! FFmpeg-based muxer implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::error::MuxError;
use super::traits::Muxer;
use super::types::{MuxJob, MuxOutput};
use crate::config::MuxerConfig;

/// Lines of stderr kept when no line looks like an error.
const STDERR_TAIL_LINES: usize = 5;

/// FFmpeg-based muxer implementation.
pub struct FfmpegMuxer {
    config: MuxerConfig,
}

impl FfmpegMuxer {
    /// Creates a new FFmpeg muxer with the given configuration.
    pub fn new(config: MuxerConfig) -> Self {
        Self { config }
    }

    /// Creates a muxer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MuxerConfig::default())
    }

    /// Builds ffmpeg arguments for a mux job.
    fn build_args(&self, job: &MuxJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            job.video_path.to_string_lossy().to_string(),
            "-i".to_string(),
            job.audio_path.to_string_lossy().to_string(),
            // Video from the first input, audio from the second
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c:v".to_string(),
            job.video_codec.clone(),
            "-c:a".to_string(),
            job.audio_codec.clone(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];

        // Extra args
        args.extend(self.config.extra_args.iter().cloned());

        // Output
        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    /// Extracts the useful part of ffmpeg's stderr.
    fn summarize_stderr(stderr: &str) -> Option<String> {
        let errors: Vec<&str> = stderr
            .lines()
            .filter(|line| line.contains("Error") || line.contains("error"))
            .collect();

        let picked = if errors.is_empty() {
            let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
            let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
            lines[start..].join("\n")
        } else {
            errors.join("\n")
        };

        if picked.trim().is_empty() {
            None
        } else {
            Some(picked)
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> MuxError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MuxError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            MuxError::Io(e)
        }
    }

    async fn ensure_input(path: &Path) -> Result<(), MuxError> {
        match tokio::fs::try_exists(path).await {
            Ok(true) => Ok(()),
            _ => Err(MuxError::InputNotFound {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn mux(&self, job: &MuxJob) -> Result<MuxOutput, MuxError> {
        let start = Instant::now();

        Self::ensure_input(&job.video_path).await?;
        Self::ensure_input(&job.audio_path).await?;

        let args = self.build_args(job);
        debug!(args = ?args, "Running ffmpeg");

        // kill_on_drop: a cancelled mux must not leave ffmpeg running
        let output = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MuxError::failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                Self::summarize_stderr(&stderr),
            ));
        }

        let output_meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| MuxError::OutputMissing {
                path: job.output_path.clone(),
            })?;

        Ok(MuxOutput {
            output_path: job.output_path.clone(),
            size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), MuxError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(MuxError::failed("ffmpeg -version failed", None));
        }
        Ok(())
    }
}
