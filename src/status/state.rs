// src/status/state.rs
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Idle,
    Checking,
    Online,
    Offline,
}

impl CheckState {
    /// Online or Offline.
    pub fn is_resolved(&self) -> bool {
        matches!(self, CheckState::Online | CheckState::Offline)
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CheckState::Idle => "Idle",
            CheckState::Checking => "Checking...",
            CheckState::Online => "Online",
            CheckState::Offline => "Offline",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub state: CheckState,
    pub payload: Option<Value>,
    pub checked_at: Option<DateTime<Utc>>,
}
