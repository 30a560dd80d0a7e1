//! Clip Review Engine - waveform extraction and playback sync for clip QC.
//!
//! Given a media resource, produces a fixed-size audio peak envelope and keeps
//! an external playback position mapped onto that envelope and onto a log of
//! timestamped quality-control issues.

pub mod issues;
pub mod playback;
pub mod session;
pub mod source;
pub mod utils;
pub mod waveform;

pub use issues::{IssueKind, IssueLog, IssueRecord};
pub use playback::{ClockEvent, PlaybackClock, PlaybackElement, PlaybackPosition};
pub use session::{EngineConfig, ReviewSession, SessionCoordinator, SessionNotice, WaveformStatus};
pub use source::{MediaResource, SampleBuffer, SamplePipeline, SourceError};
pub use utils::error::{AppError, AppResult};
pub use waveform::Envelope;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging
///
/// Honors `RUST_LOG`, defaulting to debug output for this crate.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clip_review_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Clip Review Engine v{}", env!("CARGO_PKG_VERSION"));
    }
}
