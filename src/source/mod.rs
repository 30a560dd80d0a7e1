//! Sample source adapter
//!
//! Fetches media bytes and decodes them into per-channel samples:
//! - [`MediaFetcher`] / [`AudioDecoder`] traits for the two steps
//! - [`FileFetcher`] for local paths and `file://` URLs
//! - [`WavDecoder`] (hound) and [`FfmpegDecoder`] implementations
//! - [`SamplePipeline`] tying them together under a timeout

pub mod fetch;
pub mod ffmpeg;
pub mod pipeline;
pub mod traits;
pub mod wav;

pub use fetch::FileFetcher;
pub use ffmpeg::FfmpegDecoder;
pub use pipeline::{DecodeOutcome, SamplePipeline, SniffingDecoder};
pub use traits::{AudioDecoder, DecodedChannels, MediaFetcher, MediaResource, SampleBuffer, SourceError};
pub use wav::WavDecoder;
