//! Level Curve
//!
//! ## Core formula
//! cost(1) = 0
//! cost(n) = round(BASE_XP × MULTIPLIER^(n - 2))      (n >= 2)
//! total(n) = Σ cost(i), i = 2..=n
//!
//! Each level cost is rounded on its own before summing, so `total(n)` is
//! not the rounded closed-form geometric sum. Stored user levels depend on
//! these exact boundaries.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::level_info::LevelInfo;
use crate::config::{ConfigError, ProgressionConfig};
use crate::error::{ProgressionError, Result};

static STANDARD_CURVE: Lazy<LevelCurve> = Lazy::new(|| {
    LevelCurve::from_config(&ProgressionConfig::default())
        .expect("default progression config is valid")
});

/// One row of the level roadmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub level: u32,
    /// XP to advance from the previous level into this one
    pub xp_required: u64,
    /// Cumulative XP at which this level is reached
    pub total_xp: u64,
}

/// Mapping between levels and cumulative XP
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCurve {
    base_xp: u64,
    xp_multiplier: f64,
    max_level: u32,
    /// `thresholds[n - 1]` = cumulative XP to be at level `n`
    thresholds: Vec<u64>,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl LevelCurve {
    /// Build a curve, precomputing every level threshold.
    ///
    /// Fails when the constants are out of bounds or the threshold of
    /// `max_level` does not fit in a `u64`.
    pub fn new(base_xp: u64, xp_multiplier: f64, max_level: u32) -> std::result::Result<Self, ConfigError> {
        if base_xp == 0 {
            return Err(ConfigError::Validation("base_xp must be at least 1".to_string()));
        }
        if !xp_multiplier.is_finite() || xp_multiplier <= 1.0 {
            return Err(ConfigError::Validation(format!(
                "xp_multiplier must be a finite number above 1.0, got {}",
                xp_multiplier
            )));
        }
        if max_level < 2 {
            return Err(ConfigError::Validation(format!(
                "max_level must be at least 2, got {}",
                max_level
            )));
        }

        let mut thresholds = Vec::with_capacity(max_level as usize);
        thresholds.push(0);

        let mut total: u64 = 0;
        for level in 2..=max_level {
            let cost = level_cost(base_xp, xp_multiplier, level);
            if !cost.is_finite() || cost >= u64::MAX as f64 {
                return Err(ConfigError::Validation(format!(
                    "XP cost of level {} overflows",
                    level
                )));
            }
            total = total.checked_add(cost as u64).ok_or_else(|| {
                ConfigError::Validation(format!("cumulative XP of level {} overflows", level))
            })?;
            thresholds.push(total);
        }

        Ok(Self { base_xp, xp_multiplier, max_level, thresholds })
    }

    pub fn from_config(config: &ProgressionConfig) -> std::result::Result<Self, ConfigError> {
        Self::new(config.base_xp, config.xp_multiplier, config.max_level)
    }

    /// Curve built from the default constants (100, 1.15, 50)
    pub fn standard() -> &'static LevelCurve {
        &STANDARD_CURVE
    }

    pub fn base_xp(&self) -> u64 {
        self.base_xp
    }

    pub fn xp_multiplier(&self) -> f64 {
        self.xp_multiplier
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    fn check_level(&self, level: u32) -> Result<usize> {
        if level < 1 || level > self.max_level {
            return Err(ProgressionError::InvalidLevel { level, max_level: self.max_level });
        }
        Ok(level as usize - 1)
    }

    /// XP needed to advance from `level - 1` into `level` (0 for level 1)
    pub fn xp_required_for_level(&self, level: u32) -> Result<u64> {
        let idx = self.check_level(level)?;
        if idx == 0 {
            return Ok(0);
        }
        Ok(self.thresholds[idx] - self.thresholds[idx - 1])
    }

    /// Cumulative XP at which `level` is reached (0 for level 1)
    pub fn total_xp_for_level(&self, level: u32) -> Result<u64> {
        let idx = self.check_level(level)?;
        Ok(self.thresholds[idx])
    }

    /// Level for a cumulative XP value; negative input counts as 0
    pub fn level_from_xp(&self, cumulative_xp: i64) -> u32 {
        self.level_for_xp(cumulative_xp.max(0) as u64)
    }

    /// Largest level whose threshold is <= `cumulative_xp`, capped at `max_level`
    pub fn level_for_xp(&self, cumulative_xp: u64) -> u32 {
        // thresholds[0] == 0, so at least one entry always qualifies
        self.thresholds.partition_point(|&t| t <= cumulative_xp) as u32
    }

    /// Whether `cumulative_xp` reaches `required_level`
    pub fn meets_level(&self, cumulative_xp: u64, required_level: u32) -> bool {
        self.level_for_xp(cumulative_xp) >= required_level
    }

    /// Progress details for a cumulative XP value
    pub fn level_info(&self, cumulative_xp: u64) -> LevelInfo {
        let current_level = self.level_for_xp(cumulative_xp);
        let idx = current_level as usize - 1;
        let is_max_level = current_level == self.max_level;

        let xp_for_current_level = self.thresholds[idx];
        let xp_for_next_level =
            if is_max_level { xp_for_current_level } else { self.thresholds[idx + 1] };

        let current_xp_within_level = cumulative_xp - xp_for_current_level;
        let xp_to_next_level = xp_for_next_level.saturating_sub(cumulative_xp);

        let progress_percentage = if is_max_level {
            100
        } else {
            let span = (xp_for_next_level - xp_for_current_level) as f64;
            let pct = (current_xp_within_level as f64 / span * 100.0).round();
            pct.clamp(0.0, 100.0) as u8
        };

        LevelInfo {
            cumulative_xp,
            current_level,
            current_xp_within_level,
            xp_for_current_level,
            xp_for_next_level,
            xp_to_next_level,
            progress_percentage,
            is_max_level,
        }
    }

    /// Every level with its cost and cumulative threshold
    pub fn xp_table(&self) -> Vec<LevelThreshold> {
        self.thresholds
            .iter()
            .enumerate()
            .map(|(idx, &total_xp)| LevelThreshold {
                level: idx as u32 + 1,
                xp_required: if idx == 0 { 0 } else { total_xp - self.thresholds[idx - 1] },
                total_xp,
            })
            .collect()
    }
}

fn level_cost(base_xp: u64, xp_multiplier: f64, level: u32) -> f64 {
    (base_xp as f64 * xp_multiplier.powf(f64::from(level - 2))).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn curve() -> &'static LevelCurve {
        LevelCurve::standard()
    }

    #[test]
    fn test_xp_required_for_first_levels() {
        assert_eq!(curve().xp_required_for_level(1).unwrap(), 0);
        assert_eq!(curve().xp_required_for_level(2).unwrap(), 100);
        assert_eq!(curve().xp_required_for_level(3).unwrap(), 115);
        assert_eq!(curve().xp_required_for_level(4).unwrap(), 132);
        assert_eq!(curve().xp_required_for_level(10).unwrap(), 306);
    }

    #[test]
    fn test_invalid_levels() {
        for level in [0, 51, 1000] {
            let err = curve().xp_required_for_level(level).unwrap_err();
            assert!(matches!(err, ProgressionError::InvalidLevel { max_level: 50, .. }));
            assert!(curve().total_xp_for_level(level).is_err());
        }
    }

    #[test]
    fn test_total_xp_thresholds() {
        assert_eq!(curve().total_xp_for_level(1).unwrap(), 0);
        assert_eq!(curve().total_xp_for_level(2).unwrap(), 100);
        assert_eq!(curve().total_xp_for_level(5).unwrap(), 499);
        assert_eq!(curve().total_xp_for_level(10).unwrap(), 1678);

        let level4 = curve().total_xp_for_level(4).unwrap();
        let level5 = curve().total_xp_for_level(5).unwrap();
        assert_eq!(level5, level4 + curve().xp_required_for_level(5).unwrap());
    }

    #[test]
    fn test_rounding_is_per_level() {
        // Closed-form geometric sum for level 10 rounds to 1679
        let closed_form = 100.0 * (1.15f64.powi(9) - 1.0) / 0.15;
        assert_eq!(closed_form.round() as u64, 1679);
        assert_eq!(curve().total_xp_for_level(10).unwrap(), 1678);

        let summed: u64 = (2..=10).map(|l| curve().xp_required_for_level(l).unwrap()).sum();
        assert_eq!(summed, 1678);
    }

    #[test]
    fn test_level_from_xp() {
        assert_eq!(curve().level_from_xp(0), 1);
        assert_eq!(curve().level_from_xp(50), 1);
        assert_eq!(curve().level_from_xp(99), 1);
        assert_eq!(curve().level_from_xp(100), 2);
        assert_eq!(curve().level_from_xp(1678), 10);
        assert_eq!(curve().level_from_xp(1679), 10);
        assert_eq!(curve().level_from_xp(-100), 1);
        assert_eq!(curve().level_from_xp(i64::MIN), 1);
    }

    #[test]
    fn test_level_cap() {
        let max_total = curve().total_xp_for_level(50).unwrap();
        assert_eq!(curve().level_for_xp(max_total), 50);
        assert_eq!(curve().level_for_xp(max_total + 1_000_000), 50);
        assert_eq!(curve().level_for_xp(u64::MAX), 50);
        assert_eq!(curve().level_from_xp(i64::MAX), 50);
    }

    #[test]
    fn test_meets_level() {
        assert!(curve().meets_level(0, 1));
        assert!(!curve().meets_level(99, 2));
        assert!(curve().meets_level(100, 2));
        assert!(!curve().meets_level(100, 3));
    }

    #[test]
    fn test_xp_table() {
        let table = curve().xp_table();
        assert_eq!(table.len(), 50);
        assert_eq!(table[0], LevelThreshold { level: 1, xp_required: 0, total_xp: 0 });
        assert_eq!(table[1], LevelThreshold { level: 2, xp_required: 100, total_xp: 100 });
        for row in &table {
            assert_eq!(row.xp_required, curve().xp_required_for_level(row.level).unwrap());
            assert_eq!(row.total_xp, curve().total_xp_for_level(row.level).unwrap());
        }
    }

    #[test]
    fn test_custom_curve() {
        let curve = LevelCurve::new(10, 2.0, 5).unwrap();
        // costs: 10, 20, 40, 80
        assert_eq!(curve.total_xp_for_level(5).unwrap(), 150);
        assert_eq!(curve.level_for_xp(69), 3);
        assert_eq!(curve.level_for_xp(70), 4);
        assert_eq!(curve.level_for_xp(10_000), 5);
    }

    #[test]
    fn test_invalid_curve_constants() {
        assert!(LevelCurve::new(0, 1.15, 50).is_err());
        assert!(LevelCurve::new(100, 1.0, 50).is_err());
        assert!(LevelCurve::new(100, f64::NAN, 50).is_err());
        assert!(LevelCurve::new(100, 1.15, 1).is_err());
        // 1.15^998 does not fit in u64
        assert!(LevelCurve::new(100, 1.15, 1000).is_err());
    }

    #[test]
    fn test_standard_matches_default_config() {
        let built = LevelCurve::from_config(&ProgressionConfig::default()).unwrap();
        assert_eq!(&built, LevelCurve::standard());
        assert_eq!(LevelCurve::default(), built);
    }

    proptest! {
        /// Property: thresholds strictly increase
        #[test]
        fn prop_thresholds_strictly_increase(level in 1u32..50) {
            let here = curve().total_xp_for_level(level).unwrap();
            let next = curve().total_xp_for_level(level + 1).unwrap();
            prop_assert!(here < next);
        }

        /// Property: every threshold maps back to its own level, and one XP
        /// below maps to the previous level
        #[test]
        fn prop_threshold_round_trip(level in 1u32..=50) {
            let total = curve().total_xp_for_level(level).unwrap();
            prop_assert_eq!(curve().level_for_xp(total), level);
            if level > 1 {
                prop_assert_eq!(curve().level_for_xp(total - 1), level - 1);
            }
        }

        /// Property: level never decreases as XP grows
        #[test]
        fn prop_level_monotone(a in 0u64..2_000_000, b in 0u64..2_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(curve().level_for_xp(lo) <= curve().level_for_xp(hi));
        }

        /// Property: level info stays internally consistent
        #[test]
        fn prop_level_info_consistent(xp in 0u64..1_000_000) {
            let info = curve().level_info(xp);
            prop_assert_eq!(info.current_level, curve().level_for_xp(xp));
            prop_assert!(info.progress_percentage <= 100);
            prop_assert_eq!(info.xp_for_current_level + info.current_xp_within_level, xp);
            if !info.is_max_level {
                prop_assert_eq!(xp + info.xp_to_next_level, info.xp_for_next_level);
            }
        }
    }
}
