use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub muxer: MuxerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for everything outside the API (the download form).
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where per-request files live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root for the video/audio intermediates. Each request gets its own subdirectory.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Root for muxed output awaiting delivery. Created on demand.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("tubemux")
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

/// yt-dlp extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    /// Browser user agent sent with the metadata request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Deadline for the metadata fetch in seconds (default: 60)
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,
    /// Deadline for draining both streams in seconds (default: 1800)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            metadata_timeout_secs: default_metadata_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_metadata_timeout() -> u64 {
    60
}

fn default_download_timeout() -> u64 {
    1800
}

/// ffmpeg mux configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MuxerConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Video codec directive (default: copy, no re-encode).
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    /// Timeout for one mux invocation in seconds (default: 1800)
    #[serde(default = "default_mux_timeout")]
    pub timeout_secs: u64,
    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Additional ffmpeg arguments placed before the output path.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for MuxerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            timeout_secs: default_mux_timeout(),
            log_level: default_log_level(),
            extra_args: Vec::new(),
        }
    }
}

fn default_mux_timeout() -> u64 {
    1800
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> String {
    "copy".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_log_level() -> String {
    "error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
        assert_eq!(config.storage.downloads_dir, PathBuf::from("downloads"));
        assert_eq!(config.extractor.ytdlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.muxer.video_codec, "copy");
        assert_eq!(config.muxer.audio_codec, "aac");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_custom_sections() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[logging]
format = "json"

[storage]
temp_dir = "/var/tmp/tubemux"
downloads_dir = "/srv/downloads"

[extractor]
ytdlp_path = "/opt/yt-dlp"
metadata_timeout_secs = 15

[muxer]
ffmpeg_path = "/usr/local/bin/ffmpeg"
extra_args = ["-movflags", "+faststart"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.storage.temp_dir, PathBuf::from("/var/tmp/tubemux"));
        assert_eq!(config.extractor.metadata_timeout_secs, 15);
        // untouched keys keep their defaults
        assert_eq!(config.extractor.download_timeout_secs, 1800);
        assert_eq!(config.extractor.accept_language, "en-US,en;q=0.9");
        assert_eq!(config.muxer.extra_args, vec!["-movflags", "+faststart"]);
        assert_eq!(config.muxer.timeout_secs, 1800);
    }

    #[test]
    fn test_download_and_mux_timeouts_are_independent() {
        let toml = r#"
[extractor]
download_timeout_secs = 120
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.extractor.download_timeout_secs, 120);
        assert_eq!(config.muxer.timeout_secs, default_mux_timeout());
        assert_eq!(MuxerConfig::default().timeout_secs, 1800);
    }

    #[test]
    fn test_unknown_log_format_fails() {
        let toml = r#"
[logging]
format = "xml"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_user_agent_is_a_browser() {
        let config = ExtractorConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.user_agent.contains("Chrome/120"));
    }
}
