//! XP history log entries

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::reward::XpAction;
use crate::state::UserId;

/// What produced a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Action(XpAction),
    CustomGrant,
    LevelUp,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HistoryAction::Action(action) => action.as_str(),
            HistoryAction::CustomGrant => "custom_grant",
            HistoryAction::LevelUp => "level_up",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpHistoryEntry {
    pub user_id: UserId,
    pub action: HistoryAction,
    pub xp_gained: u64,
    /// Cumulative XP after the entry
    pub total_xp: u64,
    /// Level after the entry
    pub level: u32,
    #[serde(default)]
    pub reason: Option<String>,
    /// Unix milliseconds
    pub timestamp_ms: u64,
}

impl XpHistoryEntry {
    pub fn new(
        user_id: UserId,
        action: HistoryAction,
        xp_gained: u64,
        total_xp: u64,
        level: u32,
    ) -> Self {
        Self {
            user_id,
            action,
            xp_gained,
            total_xp,
            level,
            reason: None,
            timestamp_ms: current_timestamp(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
