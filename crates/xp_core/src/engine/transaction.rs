//! Progression Transaction
//!
//! The only mutating entry point into a user's progression:
//! read state → add XP → derive level → write both fields → report.

use super::locks::UserLocks;
use super::outcome::ProgressionOutcome;
use crate::config::{ConfigError, ProgressionConfig};
use crate::curve::{LevelCurve, LevelInfo};
use crate::error::{ProgressionError, Result};
use crate::reward::{RewardTable, XpAction};
use crate::state::{ProgressionState, UserId};
use crate::store::{HistoryAction, ProgressionStore, XpHistoryEntry};

/// Stores keep XP as `i64`
const MAX_CUMULATIVE_XP: u64 = i64::MAX as u64;

/// Awards XP against a progression store.
///
/// Awards for the same user are serialized inside one engine instance, so
/// concurrent calls through a shared engine never lose an update.
pub struct ProgressionEngine<S> {
    store: S,
    curve: LevelCurve,
    rewards: RewardTable,
    locks: UserLocks,
}

impl<S: ProgressionStore> ProgressionEngine<S> {
    pub fn new(store: S, config: ProgressionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let curve = LevelCurve::from_config(&config)?;
        Ok(Self::with_parts(store, curve, config.rewards))
    }

    pub fn with_parts(store: S, curve: LevelCurve, rewards: RewardTable) -> Self {
        Self { store, curve, rewards, locks: UserLocks::default() }
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Award the fixed reward of `action`
    pub fn award_xp(&self, user_id: &UserId, action: XpAction) -> Result<ProgressionOutcome> {
        let reward = self.rewards.reward_for(action)?;
        self.apply_award(user_id, reward, HistoryAction::Action(action), None)
    }

    /// Award a caller-chosen amount, e.g. an out-of-band grant
    pub fn award_arbitrary_xp(
        &self,
        user_id: &UserId,
        amount: i64,
        reason: &str,
    ) -> Result<ProgressionOutcome> {
        let amount = match u64::try_from(amount) {
            Ok(xp) if xp > 0 => xp,
            _ => return Err(ProgressionError::InvalidAmount { amount }),
        };
        tracing::info!(user_id = %user_id, amount, reason, "custom XP grant");
        self.apply_award(user_id, amount, HistoryAction::CustomGrant, Some(reason))
    }

    /// Level details for a user; never writes
    pub fn get_level_info(&self, user_id: &UserId) -> Result<LevelInfo> {
        let state = self.load_state(user_id)?;
        Ok(self.curve.level_info(state.cumulative_xp))
    }

    /// Validated current state of a user
    pub fn get_state(&self, user_id: &UserId) -> Result<ProgressionState> {
        self.load_state(user_id)
    }

    /// Most recent history entries for a user, newest first
    pub fn xp_history(&self, user_id: &UserId, limit: usize) -> Result<Vec<XpHistoryEntry>> {
        Ok(self.store.recent_history(user_id, limit)?)
    }

    fn load_state(&self, user_id: &UserId) -> Result<ProgressionState> {
        let stored = self
            .store
            .read_progression(user_id)?
            .ok_or_else(|| ProgressionError::UserNotFound { user_id: user_id.clone() })?;
        ProgressionState::from_stored(user_id.clone(), stored, &self.curve)
    }

    fn apply_award(
        &self,
        user_id: &UserId,
        xp: u64,
        action: HistoryAction,
        reason: Option<&str>,
    ) -> Result<ProgressionOutcome> {
        let outcome = self.locks.with_user(user_id, || {
            let state = self.load_state(user_id)?;
            let previous_level = self.curve.level_for_xp(state.cumulative_xp);

            let new_cumulative_xp = state
                .cumulative_xp
                .checked_add(xp)
                .filter(|total| *total <= MAX_CUMULATIVE_XP)
                .ok_or_else(|| ProgressionError::XpOverflow {
                    user_id: user_id.clone(),
                    cumulative_xp: state.cumulative_xp,
                    amount: xp,
                })?;
            let new_level = self.curve.level_for_xp(new_cumulative_xp);

            let next = ProgressionState {
                user_id: user_id.clone(),
                cumulative_xp: new_cumulative_xp,
                level: new_level,
            };
            self.store.write_progression(user_id, next.to_stored())?;

            Ok::<_, ProgressionError>(ProgressionOutcome::new(
                user_id.clone(),
                xp,
                previous_level,
                new_level,
                new_cumulative_xp,
            ))
        })?;

        tracing::debug!(
            user_id = %user_id,
            action = %action,
            xp,
            total_xp = outcome.new_cumulative_xp,
            level = outcome.new_level,
            "XP awarded"
        );
        if outcome.leveled_up {
            tracing::info!(
                user_id = %user_id,
                from = outcome.previous_level,
                to = outcome.new_level,
                levels_gained = outcome.levels_gained,
                "level up"
            );
        }

        self.record_history(&outcome, action, reason);
        Ok(outcome)
    }

    /// History is auxiliary: the state write has already committed, so a
    /// failed append is logged and the award still succeeds.
    fn record_history(
        &self,
        outcome: &ProgressionOutcome,
        action: HistoryAction,
        reason: Option<&str>,
    ) {
        let mut entry = XpHistoryEntry::new(
            outcome.user_id.clone(),
            action,
            outcome.xp_awarded,
            outcome.new_cumulative_xp,
            outcome.new_level,
        );
        if let Some(reason) = reason {
            entry = entry.with_reason(reason);
        }

        let mut entries = vec![entry];
        if outcome.leveled_up {
            entries.push(XpHistoryEntry::new(
                outcome.user_id.clone(),
                HistoryAction::LevelUp,
                0,
                outcome.new_cumulative_xp,
                outcome.new_level,
            ));
        }

        for entry in &entries {
            if let Err(err) = self.store.append_history(entry) {
                tracing::warn!(
                    user_id = %entry.user_id,
                    action = %entry.action,
                    error = %err,
                    "failed to append XP history"
                );
            }
        }
    }
}
