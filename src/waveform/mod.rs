//! Waveform extraction module
//!
//! Turns decoded audio samples into a fixed-size peak envelope for display.

mod extractor;

pub use extractor::{extract, Envelope, DEFAULT_BLOCK_COUNT, MAX_BLOCK_COUNT};
