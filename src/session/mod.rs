//! Review session module
//!
//! - `ReviewSession`: owned state for the clip under review
//! - `SessionCoordinator`: async driver running decodes under generation tokens
//! - `EngineConfig`: tunables loaded from JSON

pub mod config;
pub mod coordinator;
pub mod state;

pub use config::EngineConfig;
pub use coordinator::{SessionCoordinator, SessionNotice};
pub use state::{DecodeRequest, ReviewSession, SessionSnapshot, WaveformStatus};
