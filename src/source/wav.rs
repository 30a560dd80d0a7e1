//! WAV decoding with hound
//!
//! Pure Rust decoder for uncompressed audio. Handles integer PCM at any bit
//! depth hound supports and 32-bit float, de-interleaved into channels.

use super::traits::{AudioDecoder, DecodedChannels, SourceError};
use async_trait::async_trait;
use hound::{SampleFormat, WavReader};
use std::io::Cursor;

/// Decodes RIFF/WAVE bytes
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

#[async_trait]
impl AudioDecoder for WavDecoder {
    async fn decode_audio(&self, bytes: Vec<u8>) -> Result<DecodedChannels, SourceError> {
        tokio::task::spawn_blocking(move || decode_wav(&bytes))
            .await
            .map_err(|e| SourceError::Decode(format!("WAV decode task failed: {}", e)))?
    }
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedChannels, SourceError> {
    let reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| SourceError::Decode(format!("Failed to parse WAV stream: {}", e)))?;

    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        return Ok(DecodedChannels::silent());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| SourceError::Decode(format!("Invalid float sample: {}", e)))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| SourceError::Decode(format!("Invalid PCM sample: {}", e)))?
        }
    };

    let frames = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    tracing::debug!(
        channels = channel_count,
        sample_rate = spec.sample_rate,
        frames,
        "Decoded WAV"
    );

    Ok(DecodedChannels {
        channels,
        sample_rate: spec.sample_rate,
    })
}
