//! XP Actions
//!
//! Named triggers that grant a fixed XP reward.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProgressionError;

/// Action a user performs to earn XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpAction {
    /// Lesson module finished
    #[serde(alias = "module")]
    ModuleComplete,
    /// Daily choice scenario answered
    DailyChoice,
    /// Quiz answered correctly
    #[serde(alias = "quiz")]
    QuizSuccess,
    /// Seven-day streak kept
    #[serde(rename = "streak_7", alias = "streak_7_days")]
    Streak7Days,
    /// Invited friend signed up
    InviteFriend,
}

impl XpAction {
    pub const ALL: [XpAction; 5] = [
        XpAction::ModuleComplete,
        XpAction::DailyChoice,
        XpAction::QuizSuccess,
        XpAction::Streak7Days,
        XpAction::InviteFriend,
    ];

    /// Canonical name, as used in config files and history entries
    pub fn as_str(&self) -> &'static str {
        match self {
            XpAction::ModuleComplete => "module_complete",
            XpAction::DailyChoice => "daily_choice",
            XpAction::QuizSuccess => "quiz_success",
            XpAction::Streak7Days => "streak_7",
            XpAction::InviteFriend => "invite_friend",
        }
    }

    /// Reward used when no configuration overrides it
    pub fn default_reward(&self) -> u64 {
        match self {
            XpAction::ModuleComplete => 50,
            XpAction::DailyChoice => 30,
            XpAction::QuizSuccess => 20,
            XpAction::Streak7Days => 100,
            XpAction::InviteFriend => 200,
        }
    }
}

impl fmt::Display for XpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for XpAction {
    type Err = ProgressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "module_complete" | "module" => Ok(XpAction::ModuleComplete),
            "daily_choice" => Ok(XpAction::DailyChoice),
            "quiz_success" | "quiz" => Ok(XpAction::QuizSuccess),
            "streak_7" | "streak_7_days" => Ok(XpAction::Streak7Days),
            "invite_friend" => Ok(XpAction::InviteFriend),
            _ => Err(ProgressionError::UnknownAction { action: s.to_string() }),
        }
    }
}
