//! Level-Curve Calculator
//!
//! Pure mapping between levels and cumulative XP on an exponential cost
//! curve with a hard level cap.
//!
//! ## Module structure
//! - `level_curve`: thresholds, XP → level lookup, level roadmap
//! - `level_info`: progress details for a cumulative XP value

pub mod level_curve;
pub mod level_info;

pub use level_curve::{LevelCurve, LevelThreshold};
pub use level_info::LevelInfo;
