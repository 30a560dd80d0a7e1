//! Peak envelope extraction
//!
//! Collapses one channel of decoded audio into a fixed number of blocks,
//! keeping the maximum absolute amplitude of each block for visualization.

use serde::{Deserialize, Serialize};

/// Default number of blocks in an envelope
pub const DEFAULT_BLOCK_COUNT: usize = 1000;

/// Largest envelope a session will allocate
pub const MAX_BLOCK_COUNT: usize = 1_000_000;

/// Fixed-resolution amplitude envelope of one audio channel
///
/// Holds exactly `block_count` values after a successful extraction, or none
/// at all when there was no audio to extract from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Peak absolute amplitude per block, always >= 0.0
    pub peaks: Vec<f32>,
}

impl Envelope {
    /// An envelope with nothing to draw
    pub fn empty() -> Self {
        Self { peaks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Largest block value, 0.0 for an empty envelope
    pub fn peak(&self) -> f32 {
        self.peaks.iter().copied().fold(0.0, f32::max)
    }

    /// Copy of the envelope scaled so its loudest block is 1.0
    ///
    /// Silent and empty envelopes come back unchanged.
    pub fn normalized(&self) -> Self {
        let peak = self.peak();
        if peak <= 0.0 {
            return self.clone();
        }
        Self {
            peaks: self.peaks.iter().map(|p| p / peak).collect(),
        }
    }

    /// Value of the block at `index`, 0.0 when out of range
    pub fn value_at(&self, index: usize) -> f32 {
        self.peaks.get(index).copied().unwrap_or(0.0)
    }
}

/// Extract a peak envelope from one channel of samples
///
/// The buffer is cut into `block_count` blocks of `len / block_count`
/// samples each (remainder samples past the last block are not scanned).
/// When there are fewer samples than blocks, each block covers one sample
/// and the trailing blocks read nothing and stay at 0.0.
pub fn extract(samples: &[f32], block_count: usize) -> Envelope {
    if samples.is_empty() || block_count == 0 {
        return Envelope::empty();
    }

    let block_size = (samples.len() / block_count).max(1);
    let mut peaks = Vec::with_capacity(block_count);

    for i in 0..block_count {
        let start = (i * block_size).min(samples.len());
        let end = (start + block_size).min(samples.len());

        // f32::max ignores NaN operands, so corrupt samples never win
        let peak = samples[start..end]
            .iter()
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max);

        peaks.push(peak);
    }

    Envelope { peaks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_empty() {
        let envelope = extract(&[], 1000);
        assert!(envelope.is_empty());
    }

    #[test]
    fn test_extract_exact_length() {
        let samples: Vec<f32> = (0..44_100).map(|i| ((i as f32) * 0.01).sin() * 0.8).collect();
        let envelope = extract(&samples, DEFAULT_BLOCK_COUNT);

        assert_eq!(envelope.len(), DEFAULT_BLOCK_COUNT);
        let input_max = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(envelope.peaks.iter().all(|&p| p >= 0.0 && p <= input_max));
    }

    #[test]
    fn test_extract_takes_absolute_peak() {
        // 8 samples, 2 blocks of 4
        let samples = vec![0.0, 0.5, -0.3, 0.2, -0.1, 0.2, 0.6, -0.9];
        let envelope = extract(&samples, 2);

        assert_eq!(envelope.peaks, vec![0.5, 0.9]);
    }

    #[test]
    fn test_extract_ignores_remainder() {
        // block size floor(5 / 2) = 2, the fifth sample is never scanned
        let samples = vec![0.1, 0.2, 0.3, 0.4, 1.0];
        let envelope = extract(&samples, 2);

        assert_eq!(envelope.peaks, vec![0.2, 0.4]);
    }

    #[test]
    fn test_extract_fewer_samples_than_blocks() {
        let samples = vec![0.25, -0.75, 0.5];
        let envelope = extract(&samples, 8);

        assert_eq!(envelope.len(), 8);
        assert_eq!(&envelope.peaks[..3], &[0.25, 0.75, 0.5]);
        assert!(envelope.peaks[3..].iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let samples: Vec<f32> = (0..10_007).map(|i| ((i * 7919) % 2000) as f32 / 1000.0 - 1.0).collect();
        assert_eq!(extract(&samples, 333), extract(&samples, 333));
    }

    #[test]
    fn test_extract_skips_nan() {
        let samples = vec![f32::NAN, 0.4, f32::NAN, f32::NAN];
        let envelope = extract(&samples, 2);

        assert_eq!(envelope.peaks, vec![0.4, 0.0]);
    }

    #[test]
    fn test_normalized() {
        let envelope = Envelope {
            peaks: vec![0.1, 0.5, 0.25],
        };
        let normalized = envelope.normalized();

        assert!((normalized.peak() - 1.0).abs() < 1e-6);
        assert!((normalized.peaks[0] - 0.2).abs() < 1e-6);
        assert_eq!(Envelope::empty().normalized(), Envelope::empty());
    }

    #[test]
    fn test_value_at_out_of_range() {
        let envelope = extract(&[0.3; 10], 5);
        assert_eq!(envelope.value_at(4), 0.3);
        assert_eq!(envelope.value_at(5), 0.0);
    }
}
