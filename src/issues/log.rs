//! Quality-control issue log
//!
//! Append-only list of issues stamped with the playback time they were
//! logged at. Insertion order is logging order, which can go backwards in
//! playback time when the reviewer scrubs back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::playback::format_time;
use crate::utils::error::{AppError, AppResult};

/// Preset issue categories offered as one-click buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    VideoGlitch,
    AudioDropout,
    SyncIssue,
    ColorIssue,
}

impl IssueKind {
    pub const ALL: [IssueKind; 4] = [
        IssueKind::VideoGlitch,
        IssueKind::AudioDropout,
        IssueKind::SyncIssue,
        IssueKind::ColorIssue,
    ];

    /// Text recorded in the log for this category
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::VideoGlitch => "Video Glitch",
            IssueKind::AudioDropout => "Audio Dropout",
            IssueKind::SyncIssue => "Sync Issue",
            IssueKind::ColorIssue => "Color Issue",
        }
    }
}

/// One logged issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    pub id: Uuid,
    /// Playback time formatted as `MM:SS`
    pub timestamp: String,
    pub description: String,
    /// Playback time in seconds when logged
    pub at_time: f64,
    /// Wall-clock time when logged
    pub logged_at: DateTime<Utc>,
}

impl IssueRecord {
    /// Display line, `MM:SS - description`
    pub fn entry(&self) -> String {
        format!("{} - {}", self.timestamp, self.description)
    }
}

/// Ordered issues for the current resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLog {
    records: Vec<IssueRecord>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue at `at_time` seconds
    ///
    /// Fails with [`AppError::InvalidArgument`] when the description is blank;
    /// the log is left untouched in that case.
    pub fn append(&mut self, description: &str, at_time: f64) -> AppResult<IssueRecord> {
        if description.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Issue description must not be empty".to_string(),
            ));
        }

        let record = IssueRecord {
            id: Uuid::new_v4(),
            timestamp: format_time(at_time),
            description: description.to_string(),
            at_time,
            logged_at: Utc::now(),
        };
        tracing::info!("Issue logged: {}", record.entry());

        self.records.push(record.clone());
        Ok(record)
    }

    /// Record a preset issue
    pub fn append_kind(&mut self, kind: IssueKind, at_time: f64) -> AppResult<IssueRecord> {
        self.append(kind.label(), at_time)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[IssueRecord] {
        &self.records
    }

    /// Display lines in logging order
    pub fn entries(&self) -> Vec<String> {
        self.records.iter().map(IssueRecord::entry).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Export the records as JSON for the frontend
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&self.records)?)
    }
}
