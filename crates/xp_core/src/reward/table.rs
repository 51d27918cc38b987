use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::action::XpAction;
use crate::error::{ProgressionError, Result};

/// Static action -> XP reward mapping for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardTable {
    rewards: BTreeMap<XpAction, u64>,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self { rewards: XpAction::ALL.iter().map(|a| (*a, a.default_reward())).collect() }
    }
}

impl RewardTable {
    /// Table with no entries; every lookup fails until rewards are set
    pub fn empty() -> Self {
        Self { rewards: BTreeMap::new() }
    }

    pub fn with_reward(mut self, action: XpAction, xp: u64) -> Self {
        self.rewards.insert(action, xp);
        self
    }

    /// Resolve the reward for an action
    pub fn reward_for(&self, action: XpAction) -> Result<u64> {
        self.rewards
            .get(&action)
            .copied()
            .ok_or_else(|| ProgressionError::UnknownAction { action: action.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = (XpAction, u64)> + '_ {
        self.rewards.iter().map(|(a, xp)| (*a, *xp))
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}
