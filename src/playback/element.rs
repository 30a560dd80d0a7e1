//! Playback element surface
//!
//! The video element lives outside the engine; the session drives it through
//! this trait and receives its reports as [`ClockEvent`](super::ClockEvent)s.

/// Outbound controls of the external playback element
pub trait PlaybackElement: Send {
    fn play(&mut self);

    fn pause(&mut self);

    /// Jump to `time` seconds
    fn seek(&mut self, time: f64);

    /// Volume in [0, 1]
    fn set_volume(&mut self, volume: f64);
}

/// Element that ignores all commands
///
/// Used when no player is attached yet, e.g. while only the waveform is shown.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedElement;

impl PlaybackElement for DetachedElement {
    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn seek(&mut self, _time: f64) {}

    fn set_volume(&mut self, _volume: f64) {}
}
