//! Playback synchronization module
//!
//! Maps the external playback position onto the waveform envelope and
//! formats timestamps for the issue log.

pub mod clock;
pub mod element;

pub use clock::{
    format_time, fraction_to_time, played_fraction, position_to_index, ClockEvent, PlaybackClock,
    PlaybackPosition,
};
pub use element::{DetachedElement, PlaybackElement};
