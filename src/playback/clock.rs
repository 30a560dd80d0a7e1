//! Playback clock
//!
//! Tracks the position reported by an external playback element and maps it
//! onto envelope space and back.

use serde::{Deserialize, Serialize};

/// Snapshot of where playback is
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPosition {
    /// Current playback time in seconds
    pub current_time: f64,
    /// Media duration in seconds, 0.0 until metadata is loaded
    pub duration: f64,
}

/// Inbound events that move the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    /// The playback element reported media metadata
    MetadataLoaded(f64),
    /// The playback element advanced
    TimeUpdated(f64),
    /// The user asked to jump to a time
    SeekRequested(f64),
    /// A different resource was selected
    ResourceChanged,
}

/// Clock state for the current resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackClock {
    position: PlaybackPosition,
    is_playing: bool,
    volume: f64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            position: PlaybackPosition::default(),
            is_playing: false,
            volume: 1.0,
        }
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn current_time(&self) -> f64 {
        self.position.current_time
    }

    pub fn duration(&self) -> f64 {
        self.position.duration
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Apply an inbound event and return the resulting position
    pub fn apply(&mut self, event: ClockEvent) -> PlaybackPosition {
        match event {
            ClockEvent::MetadataLoaded(duration) => {
                self.position.duration = non_negative(duration);
                self.position.current_time = self.clamp_to_duration(self.position.current_time);
                tracing::debug!(duration = self.position.duration, "Metadata loaded");
            }
            ClockEvent::TimeUpdated(time) | ClockEvent::SeekRequested(time) => {
                self.position.current_time = self.clamp_to_duration(non_negative(time));
            }
            ClockEvent::ResourceChanged => {
                self.position = PlaybackPosition::default();
                self.is_playing = false;
                tracing::debug!("Clock reset for new resource");
            }
        }
        self.position
    }

    /// Flip between playing and paused, returning the new state
    pub fn toggle_play(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Set the volume, clamped into [0, 1]
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.volume
    }

    /// Envelope block under the playhead
    pub fn index(&self, block_count: usize) -> usize {
        position_to_index(self.position.current_time, self.position.duration, block_count)
    }

    /// Seek target for a click at `fraction` along the envelope
    pub fn time_at(&self, fraction: f64) -> f64 {
        fraction_to_time(fraction, self.position.duration)
    }

    fn clamp_to_duration(&self, time: f64) -> f64 {
        if self.position.duration > 0.0 {
            time.min(self.position.duration)
        } else {
            time
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Map a playback time onto an envelope block index
///
/// Returns 0 while the duration is unknown; otherwise the index is clamped
/// into `[0, block_count - 1]`.
pub fn position_to_index(current_time: f64, duration: f64, block_count: usize) -> usize {
    if duration <= 0.0 || block_count == 0 || !duration.is_finite() {
        return 0;
    }
    let raw = (current_time / duration * block_count as f64).floor();
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    (raw as usize).min(block_count - 1)
}

/// Map a relative click position along the envelope to a playback time
///
/// The fraction is clamped into [0, 1] before scaling.
pub fn fraction_to_time(fraction: f64, duration: f64) -> f64 {
    let duration = non_negative(duration);
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    (fraction * duration).clamp(0.0, duration)
}

/// Share of the media already played, in [0, 1]
pub fn played_fraction(current_time: f64, duration: f64) -> f64 {
    if duration <= 0.0 || !duration.is_finite() {
        return 0.0;
    }
    (non_negative(current_time) / duration).min(1.0)
}

/// Format seconds as `MM:SS`
///
/// Both components are truncated to whole seconds and minutes keep counting
/// past 59, so a 90 minute mark reads `90:00`.
pub fn format_time(seconds: f64) -> String {
    let total = non_negative(seconds).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
