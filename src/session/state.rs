//! Review session state
//!
//! One owned struct holds everything that belongs to the selected resource:
//! the decoded samples, the envelope, the playback clock and the issue log.
//! Every handler takes `&mut self`, so events are applied one at a time.

use serde::{Deserialize, Serialize};

use crate::issues::{IssueKind, IssueLog, IssueRecord};
use crate::playback::{ClockEvent, PlaybackClock, PlaybackElement, PlaybackPosition};
use crate::source::{DecodeOutcome, MediaResource, SampleBuffer};
use crate::utils::error::AppResult;
use crate::waveform::{self, Envelope, MAX_BLOCK_COUNT};

/// Where the waveform for the current resource stands
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum WaveformStatus {
    /// No resource selected yet
    #[default]
    Idle,
    /// Decode in flight; the envelope is empty
    Loading,
    /// Envelope holds a full set of blocks
    Ready,
    /// Terminal degraded state: no audio, or fetch/decode failed
    Unavailable { reason: String },
}

/// Work order for the sample pipeline, issued on every selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    pub generation: u64,
    pub resource: MediaResource,
}

/// Serializable view of a session for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub generation: u64,
    pub resource: Option<MediaResource>,
    pub status: WaveformStatus,
    pub envelope: Envelope,
    pub position: PlaybackPosition,
    pub playhead_index: usize,
    pub is_playing: bool,
    pub volume: f64,
    pub issues: Vec<String>,
}

/// State of the clip under review
pub struct ReviewSession {
    block_count: usize,
    generation: u64,
    resource: Option<MediaResource>,
    samples: Option<SampleBuffer>,
    envelope: Envelope,
    status: WaveformStatus,
    clock: PlaybackClock,
    issues: IssueLog,
    element: Box<dyn PlaybackElement>,
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("generation", &self.generation)
            .field("resource", &self.resource)
            .field("status", &self.status)
            .field("position", &self.clock.position())
            .field("issues", &self.issues.len())
            .finish_non_exhaustive()
    }
}

impl ReviewSession {
    /// Create a session drawing envelopes of `block_count` blocks
    pub fn new(block_count: usize, element: Box<dyn PlaybackElement>) -> Self {
        Self {
            block_count: block_count.clamp(1, MAX_BLOCK_COUNT),
            generation: 0,
            resource: None,
            samples: None,
            envelope: Envelope::empty(),
            status: WaveformStatus::Idle,
            clock: PlaybackClock::new(),
            issues: IssueLog::new(),
            element,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resource(&self) -> Option<&MediaResource> {
        self.resource.as_ref()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn samples(&self) -> Option<&SampleBuffer> {
        self.samples.as_ref()
    }

    pub fn status(&self) -> &WaveformStatus {
        &self.status
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn issues(&self) -> &IssueLog {
        &self.issues
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Switch to a new resource
    ///
    /// Everything from the previous resource is dropped before this returns.
    /// The returned request must be run through the sample pipeline and its
    /// outcome handed to [`complete_decode`](Self::complete_decode).
    pub fn select_resource(&mut self, resource: MediaResource) -> DecodeRequest {
        self.generation += 1;
        tracing::info!(generation = self.generation, "Selected resource: {}", resource);

        if self.clock.is_playing() {
            self.element.pause();
        }
        self.clock.apply(ClockEvent::ResourceChanged);
        self.issues.clear();
        self.samples = None;
        self.envelope = Envelope::empty();
        self.status = WaveformStatus::Loading;
        self.resource = Some(resource.clone());

        DecodeRequest {
            generation: self.generation,
            resource,
        }
    }

    /// Fold a finished decode into the session
    ///
    /// Returns `false` and changes nothing when the outcome belongs to an
    /// earlier selection.
    pub fn complete_decode(&mut self, outcome: DecodeOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "Dropping stale decode result"
            );
            return false;
        }

        match outcome.result {
            Ok(buffer) => {
                self.envelope = waveform::extract(&buffer.samples, self.block_count);
                if self.envelope.is_empty() {
                    tracing::warn!("Decoded audio has no samples, showing no waveform");
                    self.status = WaveformStatus::Unavailable {
                        reason: "No audio samples".to_string(),
                    };
                } else {
                    tracing::info!(
                        blocks = self.envelope.len(),
                        seconds = buffer.duration_secs(),
                        "Waveform ready"
                    );
                    self.status = WaveformStatus::Ready;
                }
                self.samples = Some(buffer);
            }
            Err(e) => {
                tracing::warn!("Waveform unavailable: {}", e);
                self.samples = None;
                self.envelope = Envelope::empty();
                self.status = WaveformStatus::Unavailable {
                    reason: e.to_string(),
                };
            }
        }
        true
    }

    /// Apply a report from the playback element
    pub fn on_clock_event(&mut self, event: ClockEvent) -> PlaybackPosition {
        self.clock.apply(event)
    }

    /// Jump to `time` seconds
    pub fn seek(&mut self, time: f64) -> f64 {
        let position = self.clock.apply(ClockEvent::SeekRequested(time));
        self.element.seek(position.current_time);
        position.current_time
    }

    /// Jump to a click at `fraction` along the envelope
    pub fn seek_to_fraction(&mut self, fraction: f64) -> f64 {
        let time = self.clock.time_at(fraction);
        self.seek(time)
    }

    pub fn toggle_play(&mut self) -> bool {
        let playing = self.clock.toggle_play();
        if playing {
            self.element.play();
        } else {
            self.element.pause();
        }
        playing
    }

    pub fn set_volume(&mut self, volume: f64) -> f64 {
        let volume = self.clock.set_volume(volume);
        self.element.set_volume(volume);
        volume
    }

    /// Envelope block under the playhead
    pub fn playhead_index(&self) -> usize {
        self.clock.index(self.envelope.len())
    }

    /// Log an issue at the current playback time
    pub fn add_issue(&mut self, description: &str) -> AppResult<IssueRecord> {
        self.issues.append(description, self.clock.current_time())
    }

    /// Log a preset issue at the current playback time
    pub fn add_preset_issue(&mut self, kind: IssueKind) -> AppResult<IssueRecord> {
        self.issues.append_kind(kind, self.clock.current_time())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            resource: self.resource.clone(),
            status: self.status.clone(),
            envelope: self.envelope.clone(),
            position: self.clock.position(),
            playhead_index: self.playhead_index(),
            is_playing: self.clock.is_playing(),
            volume: self.clock.volume(),
            issues: self.issues.entries(),
        }
    }
}
