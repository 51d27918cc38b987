//! Caller-side level-up effects
//!
//! The engine only returns outcomes. UI layers (celebration modal, push
//! notification, ...) react through a `LevelUpHandler`.

use serde::{Deserialize, Serialize};

use super::outcome::ProgressionOutcome;
use crate::state::UserId;

/// Data a level-up celebration needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpNotice {
    pub user_id: UserId,
    pub new_level: u32,
    pub levels_gained: u32,
}

impl LevelUpNotice {
    /// `None` unless the outcome leveled up
    pub fn from_outcome(outcome: &ProgressionOutcome) -> Option<Self> {
        outcome.leveled_up.then(|| Self {
            user_id: outcome.user_id.clone(),
            new_level: outcome.new_level,
            levels_gained: outcome.levels_gained,
        })
    }
}

pub trait LevelUpHandler {
    fn on_level_up(&self, notice: &LevelUpNotice);
}

impl<F: Fn(&LevelUpNotice)> LevelUpHandler for F {
    fn on_level_up(&self, notice: &LevelUpNotice) {
        self(notice)
    }
}

/// Handler that only logs the level-up
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLevelUpHandler;

impl LevelUpHandler for LogLevelUpHandler {
    fn on_level_up(&self, notice: &LevelUpNotice) {
        tracing::info!(
            user_id = %notice.user_id,
            new_level = notice.new_level,
            levels_gained = notice.levels_gained,
            "level up"
        );
    }
}

/// Forward an outcome to `handler` if it leveled up; returns whether it did
pub fn dispatch_level_up<H: LevelUpHandler + ?Sized>(
    outcome: &ProgressionOutcome,
    handler: &H,
) -> bool {
    match LevelUpNotice::from_outcome(outcome) {
        Some(notice) => {
            handler.on_level_up(&notice);
            true
        }
        None => false,
    }
}
