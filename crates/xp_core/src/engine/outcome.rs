use serde::{Deserialize, Serialize};

use crate::state::UserId;

/// Result of one award
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionOutcome {
    pub user_id: UserId,
    pub xp_awarded: u64,
    pub previous_level: u32,
    pub new_level: u32,
    pub new_cumulative_xp: u64,
    pub leveled_up: bool,
    pub levels_gained: u32,
}

impl ProgressionOutcome {
    pub(crate) fn new(
        user_id: UserId,
        xp_awarded: u64,
        previous_level: u32,
        new_level: u32,
        new_cumulative_xp: u64,
    ) -> Self {
        // Awards are additive, so the level never drops
        let levels_gained = new_level.saturating_sub(previous_level);
        Self {
            user_id,
            xp_awarded,
            previous_level,
            new_level,
            new_cumulative_xp,
            leveled_up: new_level > previous_level,
            levels_gained,
        }
    }
}
