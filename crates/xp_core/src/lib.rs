//! # xp_core - XP and Level Progression Engine
//!
//! Maps cumulative experience points to levels on an exponential cost
//! curve and awards XP to users through a pluggable progression store.
//!
//! ## Features
//! - Deterministic level curve with per-level rounding and a hard cap
//! - Action → reward table, configurable per deployment
//! - Award transaction that keeps stored XP and level in sync
//! - Per-user serialization of concurrent awards
//! - In-memory and file-backed stores with an XP history log

pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod reward;
pub mod state;
pub mod store;

pub use config::{load_from_env, ConfigError, ProgressionConfig};
pub use curve::{LevelCurve, LevelInfo, LevelThreshold};
pub use engine::{
    dispatch_level_up, LevelUpHandler, LevelUpNotice, LogLevelUpHandler, ProgressionEngine,
    ProgressionOutcome,
};
pub use error::{ProgressionError, Result};
pub use reward::{RewardTable, XpAction};
pub use state::{ProgressionState, StoredProgression, UserId};
pub use store::{
    FileStore, HistoryAction, MemoryStore, ProgressionStore, StoreError, XpHistoryEntry,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
