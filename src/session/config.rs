//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::utils::error::{AppError, AppResult};
use crate::waveform::{DEFAULT_BLOCK_COUNT, MAX_BLOCK_COUNT};

/// Configuration for a review session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of blocks in every extracted envelope
    #[serde(default = "default_block_count")]
    pub block_count: usize,

    /// Upper bound on fetch + decode, in milliseconds
    #[serde(default = "default_decode_timeout_ms")]
    pub decode_timeout_ms: u64,

    /// FFmpeg executable used for non-WAV containers
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Buffered session notices per subscriber
    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,
}

fn default_block_count() -> usize {
    DEFAULT_BLOCK_COUNT
}

fn default_decode_timeout_ms() -> u64 {
    30_000
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_notice_capacity() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_count: default_block_count(),
            decode_timeout_ms: default_decode_timeout_ms(),
            ffmpeg_path: default_ffmpeg_path(),
            notice_capacity: default_notice_capacity(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.block_count == 0 {
            return Err(AppError::Config("blockCount must be greater than 0".to_string()));
        }
        if self.block_count > MAX_BLOCK_COUNT {
            return Err(AppError::Config(format!(
                "blockCount must be at most {}",
                MAX_BLOCK_COUNT
            )));
        }
        if self.decode_timeout_ms == 0 {
            return Err(AppError::Config(
                "decodeTimeoutMs must be greater than 0".to_string(),
            ));
        }
        if self.notice_capacity == 0 {
            return Err(AppError::Config(
                "noticeCapacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.block_count, 1000);
        assert_eq!(config.decode_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "blockCount": 500, "ffmpegPath": "/opt/ffmpeg/bin/ffmpeg" }}"#)?;

        let config = EngineConfig::load(file.path())?;

        assert_eq!(config.block_count, 500);
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.decode_timeout_ms, 30_000);
        Ok(())
    }

    #[test]
    fn test_zero_block_count_rejected() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "blockCount": 0 }}"#)?;

        let result = EngineConfig::load(file.path());
        assert!(matches!(result, Err(AppError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_oversized_block_count_rejected() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "blockCount": 4611686018427387904 }}"#)?;

        let result = EngineConfig::load(file.path());
        assert!(matches!(result, Err(AppError::Config(_))));

        let at_limit = EngineConfig {
            block_count: MAX_BLOCK_COUNT,
            ..EngineConfig::default()
        };
        assert!(at_limit.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_malformed_json() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "blockCount = 10")?;

        let result = EngineConfig::load(file.path());
        assert!(matches!(result, Err(AppError::Serialization(_))));
        Ok(())
    }
}
