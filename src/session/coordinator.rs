//! Session coordinator
//!
//! Drives a [`ReviewSession`] from async code: runs the sample pipeline in a
//! background task for every selection and folds the result back in under
//! the selection's generation token.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::config::EngineConfig;
use super::state::{ReviewSession, SessionSnapshot, WaveformStatus};
use crate::issues::{IssueKind, IssueRecord};
use crate::playback::{ClockEvent, PlaybackElement, PlaybackPosition};
use crate::source::{DecodeOutcome, MediaResource, SamplePipeline};
use crate::utils::error::AppResult;

/// Events emitted as the session changes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SessionNotice {
    /// A new resource was selected and its decode started
    ResourceSelected {
        generation: u64,
        resource: MediaResource,
    },
    /// Envelope extracted
    WaveformReady { generation: u64, blocks: usize },
    /// Decode failed or found no audio
    WaveformUnavailable { generation: u64, reason: String },
    /// A decode finished after a newer selection and was discarded; only
    /// seen when a finished decode races a reselect
    StaleDecodeDropped { generation: u64 },
    /// An issue was added to the log
    IssueLogged(IssueRecord),
}

/// Owns the session and its in-flight decode
pub struct SessionCoordinator {
    session: Arc<Mutex<ReviewSession>>,
    pipeline: SamplePipeline,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    notice_tx: broadcast::Sender<SessionNotice>,
}

impl SessionCoordinator {
    pub fn new(
        config: &EngineConfig,
        pipeline: SamplePipeline,
        element: Box<dyn PlaybackElement>,
    ) -> Self {
        let (notice_tx, _) = broadcast::channel(config.notice_capacity.max(1));
        Self {
            session: Arc::new(Mutex::new(ReviewSession::new(config.block_count, element))),
            pipeline,
            in_flight: Mutex::new(None),
            notice_tx,
        }
    }

    /// Coordinator reading local files, decoded via WAV sniffing or FFmpeg
    pub fn from_config(config: &EngineConfig, element: Box<dyn PlaybackElement>) -> AppResult<Self> {
        config.validate()?;
        let pipeline = SamplePipeline::local(&config.ffmpeg_path, config.decode_timeout());
        Ok(Self::new(config, pipeline, element))
    }

    /// Subscribe to session notices
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.notice_tx.subscribe()
    }

    /// Select a resource and start decoding it in the background
    ///
    /// Must be called from within a Tokio runtime. Returns the generation
    /// assigned to this selection.
    pub fn select(&self, resource: MediaResource) -> u64 {
        // Held until the new handle is stored so that handle order always
        // matches generation order across concurrent callers
        let mut in_flight = self.in_flight.lock();

        let request = self.session.lock().select_resource(resource);
        let generation = request.generation;
        let _ = self.notice_tx.send(SessionNotice::ResourceSelected {
            generation,
            resource: request.resource.clone(),
        });

        let session = Arc::clone(&self.session);
        let pipeline = self.pipeline.clone();
        let notice_tx = self.notice_tx.clone();

        let handle = tokio::spawn(async move {
            let outcome = pipeline.run(request.generation, request.resource).await;
            let notice = finish_decode(&session, outcome);
            let _ = notice_tx.send(notice);
        });

        // The generation check already discards the old result; aborting
        // just stops the wasted fetch/decode work
        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }

        generation
    }

    /// Forward a report from the playback element
    pub fn clock_event(&self, event: ClockEvent) -> PlaybackPosition {
        self.session.lock().on_clock_event(event)
    }

    pub fn seek(&self, time: f64) -> f64 {
        self.session.lock().seek(time)
    }

    pub fn seek_to_fraction(&self, fraction: f64) -> f64 {
        self.session.lock().seek_to_fraction(fraction)
    }

    pub fn toggle_play(&self) -> bool {
        self.session.lock().toggle_play()
    }

    pub fn set_volume(&self, volume: f64) -> f64 {
        self.session.lock().set_volume(volume)
    }

    pub fn add_issue(&self, description: &str) -> AppResult<IssueRecord> {
        let record = self.session.lock().add_issue(description)?;
        let _ = self.notice_tx.send(SessionNotice::IssueLogged(record.clone()));
        Ok(record)
    }

    pub fn add_preset_issue(&self, kind: IssueKind) -> AppResult<IssueRecord> {
        let record = self.session.lock().add_preset_issue(kind)?;
        let _ = self.notice_tx.send(SessionNotice::IssueLogged(record.clone()));
        Ok(record)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    /// Run `f` against the session while holding its lock
    pub fn with_session<R>(&self, f: impl FnOnce(&ReviewSession) -> R) -> R {
        f(&self.session.lock())
    }
}

/// Fold a decode outcome into the session and describe what happened
///
/// Superseded tasks are normally aborted, so a stale drop only shows up when
/// a decode had already finished its pipeline as a newer selection came in.
fn finish_decode(session: &Mutex<ReviewSession>, outcome: DecodeOutcome) -> SessionNotice {
    let generation = outcome.generation;
    let mut session = session.lock();

    if !session.complete_decode(outcome) {
        return SessionNotice::StaleDecodeDropped { generation };
    }
    match session.status() {
        WaveformStatus::Unavailable { reason } => SessionNotice::WaveformUnavailable {
            generation,
            reason: reason.clone(),
        },
        _ => SessionNotice::WaveformReady {
            generation,
            blocks: session.envelope().len(),
        },
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
    }
}
