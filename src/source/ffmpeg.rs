//! FFmpeg-based audio decoding
//!
//! Stages container bytes in a temporary file, runs FFmpeg on it and reads
//! the first audio channel back as raw 32-bit float PCM. FFmpeg gets a
//! seekable input, so MP4s with the `moov` atom after `mdat` decode too.

use super::traits::{AudioDecoder, DecodedChannels, SourceError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Sample rate FFmpeg resamples to, enough for peak envelopes
pub const DEFAULT_DECODE_SAMPLE_RATE: u32 = 8000;

/// Decodes audio by shelling out to FFmpeg
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg_path: String,
    sample_rate: u32,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegDecoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            sample_rate: DEFAULT_DECODE_SAMPLE_RATE,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    fn build_args(&self, input: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-map".to_string(),
            "0:a:0".to_string(),
            // Channel 0 only, no downmix
            "-af".to_string(),
            "pan=mono|c0=c0".to_string(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-f".to_string(),
            "f32le".to_string(),
            "-acodec".to_string(),
            "pcm_f32le".to_string(),
            "pipe:1".to_string(),
        ]
    }
}

#[async_trait]
impl AudioDecoder for FfmpegDecoder {
    async fn decode_audio(&self, bytes: Vec<u8>) -> Result<DecodedChannels, SourceError> {
        // Removed when dropped, after FFmpeg has exited
        let input = tempfile::Builder::new()
            .prefix("clip-review-")
            .tempfile()?;
        tokio::fs::write(input.path(), &bytes).await?;

        let output = Command::new(&self.ffmpeg_path)
            .args(self.build_args(input.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SourceError::Ffmpeg(format!("Failed to run FFmpeg decoder: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if reports_missing_audio(&stderr) {
                tracing::info!("FFmpeg found no audio stream");
                return Ok(DecodedChannels::silent());
            }
            return Err(SourceError::Ffmpeg(format!(
                "FFmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let samples = parse_f32le(&output.stdout);
        Ok(DecodedChannels {
            channels: vec![samples],
            sample_rate: self.sample_rate,
        })
    }
}

/// Whether FFmpeg's stderr says the input has no audio to map
fn reports_missing_audio(stderr: &str) -> bool {
    stderr.contains("matches no streams") || stderr.contains("does not contain any stream")
}

/// Convert raw little-endian f32 bytes to samples, dropping a partial tail
fn parse_f32le(raw: &[u8]) -> Vec<f32> {
    raw.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f32le() {
        let mut raw = Vec::new();
        for s in [0.5_f32, -1.0, 0.125] {
            raw.extend_from_slice(&s.to_le_bytes());
        }
        raw.push(0xFF);

        assert_eq!(parse_f32le(&raw), vec![0.5, -1.0, 0.125]);
        assert!(parse_f32le(&[]).is_empty());
    }

    #[test]
    fn test_reports_missing_audio() {
        assert!(reports_missing_audio(
            "Stream map '0:a:0' matches no streams.\nTo ignore this, add a trailing '?' to the map."
        ));
        assert!(!reports_missing_audio("Invalid data found when processing input"));
    }

    #[test]
    fn test_args_select_first_audio_channel() {
        let args = FfmpegDecoder::default()
            .with_sample_rate(16_000)
            .build_args(Path::new("/tmp/clip-review-x"));

        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "/tmp/clip-review-x"));
        assert!(!args.iter().any(|a| a == "pipe:0"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a:0"));
        assert!(args.windows(2).any(|w| w[0] == "-ar" && w[1] == "16000"));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_ffmpeg_error() {
        let decoder = FfmpegDecoder::new("/nonexistent/ffmpeg-binary");
        let result = decoder.decode_audio(vec![0; 16]).await;
        assert!(matches!(result, Err(SourceError::Ffmpeg(_))));
    }

    fn ffmpeg_available() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_decode_mp4_with_trailing_moov() -> anyhow::Result<()> {
        if !ffmpeg_available() {
            eprintln!("ffmpeg not installed, skipping");
            return Ok(());
        }

        // Without +faststart the mp4 muxer writes moov after mdat
        let dir = tempfile::tempdir()?;
        let clip = dir.path().join("clip.mp4");
        let status = std::process::Command::new("ffmpeg")
            .args([
                "-hide_banner", "-loglevel", "error", "-y",
                "-f", "lavfi", "-i", "testsrc=size=64x64:rate=10:duration=1",
                "-f", "lavfi", "-i", "sine=frequency=440:sample_rate=8000:duration=1",
                "-c:v", "mpeg4", "-c:a", "aac", "-shortest",
            ])
            .arg(&clip)
            .status()?;
        assert!(status.success());

        let bytes = std::fs::read(&clip)?;
        let moov = bytes.windows(4).position(|w| w == b"moov");
        let mdat = bytes.windows(4).position(|w| w == b"mdat");
        assert!(mdat < moov, "fixture should have moov after mdat");

        let decoded = FfmpegDecoder::default().decode_audio(bytes).await?;

        assert_eq!(decoded.channels.len(), 1);
        assert_eq!(decoded.sample_rate, DEFAULT_DECODE_SAMPLE_RATE);
        assert!(decoded.channels[0].len() > 4000);
        assert!(decoded.channels[0].iter().any(|s| s.abs() > 0.05));
        Ok(())
    }

    #[tokio::test]
    async fn test_decode_video_without_audio_is_silent() -> anyhow::Result<()> {
        if !ffmpeg_available() {
            eprintln!("ffmpeg not installed, skipping");
            return Ok(());
        }

        let dir = tempfile::tempdir()?;
        let clip = dir.path().join("mute.mp4");
        let status = std::process::Command::new("ffmpeg")
            .args([
                "-hide_banner", "-loglevel", "error", "-y",
                "-f", "lavfi", "-i", "testsrc=size=64x64:rate=10:duration=1",
                "-c:v", "mpeg4",
            ])
            .arg(&clip)
            .status()?;
        assert!(status.success());

        let decoded = FfmpegDecoder::default().decode_audio(std::fs::read(&clip)?).await?;
        assert!(decoded.channels.is_empty());
        Ok(())
    }
}
