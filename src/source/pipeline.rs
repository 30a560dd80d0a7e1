//! Fetch and decode pipeline
//!
//! Runs fetch -> decode under a timeout and reduces the decoder output to
//! the single channel the envelope is drawn from.

use super::ffmpeg::FfmpegDecoder;
use super::fetch::FileFetcher;
use super::traits::{AudioDecoder, DecodedChannels, MediaFetcher, MediaResource, SampleBuffer, SourceError};
use super::wav::WavDecoder;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Completion of one decode, tagged with the selection that started it
#[derive(Debug)]
pub struct DecodeOutcome {
    pub generation: u64,
    pub result: Result<SampleBuffer, SourceError>,
}

/// Picks the WAV decoder for RIFF/WAVE input and FFmpeg for everything else
#[derive(Debug, Clone, Default)]
pub struct SniffingDecoder {
    wav: WavDecoder,
    ffmpeg: FfmpegDecoder,
}

impl SniffingDecoder {
    pub fn new(ffmpeg: FfmpegDecoder) -> Self {
        Self {
            wav: WavDecoder,
            ffmpeg,
        }
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[async_trait]
impl AudioDecoder for SniffingDecoder {
    async fn decode_audio(&self, bytes: Vec<u8>) -> Result<DecodedChannels, SourceError> {
        if is_riff_wave(&bytes) {
            self.wav.decode_audio(bytes).await
        } else {
            self.ffmpeg.decode_audio(bytes).await
        }
    }
}

/// Sample source adapter: fetcher + decoder + timeout
#[derive(Clone)]
pub struct SamplePipeline {
    fetcher: Arc<dyn MediaFetcher>,
    decoder: Arc<dyn AudioDecoder>,
    timeout: Duration,
}

impl std::fmt::Debug for SamplePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplePipeline")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SamplePipeline {
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        decoder: Arc<dyn AudioDecoder>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            timeout,
        }
    }

    /// Local files, decoded by WAV sniffing with an FFmpeg fallback
    pub fn local(ffmpeg_path: &str, timeout: Duration) -> Self {
        Self::new(
            Arc::new(FileFetcher),
            Arc::new(SniffingDecoder::new(FfmpegDecoder::new(ffmpeg_path))),
            timeout,
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and decode `resource`, returning its first channel
    ///
    /// Zero decoded channels is reported as [`SourceError::NoAudioTrack`].
    pub async fn load(&self, resource: &MediaResource) -> Result<SampleBuffer, SourceError> {
        let work = async {
            let bytes = self.fetcher.fetch_bytes(resource).await?;
            let decoded = self.decoder.decode_audio(bytes).await?;
            decoded.into_first_channel().ok_or(SourceError::NoAudioTrack)
        };

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// [`load`](Self::load) tagged with `generation`
    pub async fn run(&self, generation: u64, resource: MediaResource) -> DecodeOutcome {
        tracing::info!(generation, "Decoding audio for {}", resource);
        let result = self.load(&resource).await;
        DecodeOutcome { generation, result }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::wav::tests::wav_bytes;

    /// Fetcher that serves fixed bytes after an optional delay
    pub(crate) struct StaticFetcher {
        pub bytes: Vec<u8>,
        pub delay: Duration,
    }

    #[async_trait]
    impl MediaFetcher for StaticFetcher {
        async fn fetch_bytes(&self, _resource: &MediaResource) -> Result<Vec<u8>, SourceError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.bytes.clone())
        }
    }

    struct SilentDecoder;

    #[async_trait]
    impl AudioDecoder for SilentDecoder {
        async fn decode_audio(&self, _bytes: Vec<u8>) -> Result<DecodedChannels, SourceError> {
            Ok(DecodedChannels::silent())
        }
    }

    fn wav_pipeline(delay: Duration, timeout: Duration) -> SamplePipeline {
        SamplePipeline::new(
            Arc::new(StaticFetcher {
                bytes: wav_bytes(1, 8000, &[0, 16384, -32768, 8192]),
                delay,
            }),
            Arc::new(SniffingDecoder::default()),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_load_wav() {
        let pipeline = wav_pipeline(Duration::ZERO, Duration::from_secs(5));
        let buffer = pipeline.load(&MediaResource::new("clip.wav")).await.unwrap();

        assert_eq!(buffer.sample_rate, 8000);
        assert_eq!(buffer.samples, vec![0.0, 0.5, -1.0, 0.25]);
    }

    #[tokio::test]
    async fn test_no_channels_is_no_audio_track() {
        let pipeline = SamplePipeline::new(
            Arc::new(StaticFetcher {
                bytes: Vec::new(),
                delay: Duration::ZERO,
            }),
            Arc::new(SilentDecoder),
            Duration::from_secs(5),
        );

        let outcome = pipeline.run(7, MediaResource::new("silent.mp4")).await;
        assert_eq!(outcome.generation, 7);
        assert!(matches!(outcome.result, Err(SourceError::NoAudioTrack)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let pipeline = wav_pipeline(Duration::from_secs(60), Duration::from_millis(250));
        let result = pipeline.load(&MediaResource::new("slow.wav")).await;

        assert!(matches!(result, Err(SourceError::Timeout(250))));
    }

    #[test]
    fn test_riff_sniffing() {
        assert!(is_riff_wave(&wav_bytes(1, 8000, &[0])));
        assert!(!is_riff_wave(b"\x00\x00\x00\x18ftypmp42"));
        assert!(!is_riff_wave(b"RIFF"));
    }
}
