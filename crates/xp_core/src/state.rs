//! Per-user progression state
//!
//! `StoredProgression` is the raw record a store hands back. It is only
//! trusted after `ProgressionState::from_stored` has validated it against
//! the level curve.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::curve::LevelCurve;
use crate::error::{ProgressionError, Result};

/// Opaque user identifier, owned by the external user entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier (v4 UUID)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Record as read from / written to a progression store.
///
/// Fields are signed; negative values are rejected by
/// `ProgressionState::from_stored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProgression {
    pub cumulative_xp: i64,
    pub level: i64,
}

impl StoredProgression {
    pub fn initial() -> Self {
        Self { cumulative_xp: 0, level: 1 }
    }
}

/// Validated progression of one user.
///
/// `level` is always the level the curve derives from `cumulative_xp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub user_id: UserId,
    pub cumulative_xp: u64,
    pub level: u32,
}

impl ProgressionState {
    /// State of a freshly created profile
    pub fn new(user_id: UserId) -> Self {
        Self { user_id, cumulative_xp: 0, level: 1 }
    }

    /// Validate a raw store record.
    ///
    /// Negative XP or an out-of-range level is rejected. A level that is in
    /// range but disagrees with the XP is replaced by the derived level; the
    /// next write persists the corrected value.
    pub fn from_stored(
        user_id: UserId,
        stored: StoredProgression,
        curve: &LevelCurve,
    ) -> Result<Self> {
        let cumulative_xp = u64::try_from(stored.cumulative_xp).map_err(|_| {
            ProgressionError::MalformedRecord {
                user_id: user_id.clone(),
                reason: format!("negative cumulative XP {}", stored.cumulative_xp),
            }
        })?;

        let max_level = curve.max_level();
        if stored.level < 1 || stored.level > i64::from(max_level) {
            return Err(ProgressionError::MalformedRecord {
                user_id,
                reason: format!("level {} outside 1..={}", stored.level, max_level),
            });
        }

        let level = curve.level_for_xp(cumulative_xp);
        if i64::from(level) != stored.level {
            tracing::warn!(
                user_id = %user_id,
                stored_level = stored.level,
                derived_level = level,
                cumulative_xp,
                "stored level disagrees with XP, using derived level"
            );
        }

        Ok(Self { user_id, cumulative_xp, level })
    }

    pub fn to_stored(&self) -> StoredProgression {
        StoredProgression {
            cumulative_xp: i64::try_from(self.cumulative_xp).unwrap_or(i64::MAX),
            level: i64::from(self.level),
        }
    }
}
