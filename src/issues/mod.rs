//! Issue logging module

pub mod log;

pub use log::{IssueKind, IssueLog, IssueRecord};
