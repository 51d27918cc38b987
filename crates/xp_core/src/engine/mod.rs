//! Progression Engine
//!
//! ## Module structure
//! - `transaction`: `ProgressionEngine` (award, grant, level info, history)
//! - `outcome`: `ProgressionOutcome` returned by every award
//! - `effects`: caller-side level-up dispatch
//! - `locks`: per-user serialization
//!
//! ## Flow
//! 1. Caller invokes `award_xp(user, action)`
//! 2. Reward resolved from the `RewardTable`
//! 3. State read and validated, XP added, level derived, both written back
//! 4. Caller passes the outcome to `dispatch_level_up()` for UI feedback

pub mod effects;
mod locks;
pub mod outcome;
pub mod transaction;


pub use effects::{dispatch_level_up, LevelUpHandler, LevelUpNotice, LogLevelUpHandler};
pub use outcome::ProgressionOutcome;
pub use transaction::ProgressionEngine;
