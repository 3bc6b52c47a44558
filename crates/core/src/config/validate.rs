use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Stage deadlines are not 0
/// - Tool paths and the audio codec are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let timeouts = [
        (
            "extractor.metadata_timeout_secs",
            config.extractor.metadata_timeout_secs,
        ),
        (
            "extractor.download_timeout_secs",
            config.extractor.download_timeout_secs,
        ),
        ("muxer.timeout_secs", config.muxer.timeout_secs),
    ];
    for (key, value) in timeouts {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", key)));
        }
    }

    if config.extractor.ytdlp_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "extractor.ytdlp_path cannot be empty".to_string(),
        ));
    }

    if config.muxer.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "muxer.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.muxer.audio_codec.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "muxer.audio_codec cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.muxer.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("muxer.timeout_secs"));
    }

    #[test]
    fn test_validate_empty_tool_path_fails() {
        let mut config = Config::default();
        config.extractor.ytdlp_path = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_blank_audio_codec_fails() {
        let mut config = Config::default();
        config.muxer.audio_codec = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
