//! Sample source trait definitions
//!
//! The engine only needs bytes for a resource and a way to turn those bytes
//! into per-channel samples. Both are async and may fail.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Locator of a video+audio container, usually a URL or file path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaResource(String);

impl MediaResource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local filesystem path for plain paths and `file://` URLs
    ///
    /// Returns `None` for any other URL scheme.
    pub fn to_local_path(&self) -> Option<PathBuf> {
        if let Some(rest) = self.0.strip_prefix("file://") {
            let decoded = urlencoding::decode(rest).ok()?;
            return Some(PathBuf::from(decoded.into_owned()));
        }
        if self.0.contains("://") {
            return None;
        }
        Some(PathBuf::from(&self.0))
    }
}

impl std::fmt::Display for MediaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaResource {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}

/// Samples of a single channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the buffer in seconds, 0.0 if the rate is unknown
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Every channel a decoder produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedChannels {
    /// One sample vector per channel; empty when there is no audio track
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl DecodedChannels {
    /// Decoder result for media without audio
    pub fn silent() -> Self {
        Self::default()
    }

    /// Take the first channel, the only one the envelope is drawn from
    pub fn into_first_channel(self) -> Option<SampleBuffer> {
        let sample_rate = self.sample_rate;
        self.channels
            .into_iter()
            .next()
            .map(|samples| SampleBuffer {
                samples,
                sample_rate,
            })
    }
}

/// Fetch and decode failures
///
/// None of these are fatal: the session degrades to a waveform-less view.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Decode timed out after {0}ms")]
    Timeout(u64),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

/// Fetches the raw bytes of a media resource
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_bytes(&self, resource: &MediaResource) -> Result<Vec<u8>, SourceError>;
}

/// Decodes container bytes into per-channel samples
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    async fn decode_audio(&self, bytes: Vec<u8>) -> Result<DecodedChannels, SourceError>;
}
