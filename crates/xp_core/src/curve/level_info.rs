use serde::{Deserialize, Serialize};

/// Where a cumulative XP value sits on the level curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub cumulative_xp: u64,
    pub current_level: u32,
    /// XP earned since reaching `current_level`
    pub current_xp_within_level: u64,
    /// Threshold of the current level
    pub xp_for_current_level: u64,
    /// Threshold of the next level (same as current at the cap)
    pub xp_for_next_level: u64,
    pub xp_to_next_level: u64,
    /// 0-100, always 100 at the cap
    pub progress_percentage: u8,
    pub is_max_level: bool,
}

#[cfg(test)]
mod tests {
    use crate::curve::LevelCurve;

    fn curve() -> &'static LevelCurve {
        LevelCurve::standard()
    }

    #[test]
    fn test_info_at_zero() {
        let info = curve().level_info(0);
        assert_eq!(info.current_level, 1);
        assert_eq!(info.current_xp_within_level, 0);
        assert_eq!(info.xp_for_current_level, 0);
        assert_eq!(info.xp_for_next_level, 100);
        assert_eq!(info.xp_to_next_level, 100);
        assert_eq!(info.progress_percentage, 0);
        assert!(!info.is_max_level);
    }

    #[test]
    fn test_info_exactly_at_threshold() {
        let level5 = curve().total_xp_for_level(5).unwrap();
        let info = curve().level_info(level5);
        assert_eq!(info.current_level, 5);
        assert_eq!(info.current_xp_within_level, 0);
        assert_eq!(info.progress_percentage, 0);
        assert_eq!(info.xp_to_next_level, curve().xp_required_for_level(6).unwrap());
    }

    #[test]
    fn test_info_midway() {
        let level2 = curve().total_xp_for_level(2).unwrap();
        let level3 = curve().total_xp_for_level(3).unwrap();
        let info = curve().level_info(level2 + (level3 - level2) / 2);
        assert_eq!(info.current_level, 2);
        assert!(info.progress_percentage >= 45 && info.progress_percentage <= 55);
    }

    #[test]
    fn test_info_at_cap() {
        let max_total = curve().total_xp_for_level(50).unwrap();
        let info = curve().level_info(max_total + 1_000_000);
        assert_eq!(info.current_level, 50);
        assert!(info.is_max_level);
        assert_eq!(info.progress_percentage, 100);
        assert_eq!(info.xp_to_next_level, 0);
        assert_eq!(info.xp_for_next_level, info.xp_for_current_level);
        assert_eq!(info.current_xp_within_level, 1_000_000);
    }

    #[test]
    fn test_info_is_repeatable() {
        assert_eq!(curve().level_info(1234), curve().level_info(1234));
    }

    #[test]
    fn test_info_snapshot() {
        insta::assert_json_snapshot!(curve().level_info(157), @r###"
        {
          "cumulative_xp": 157,
          "current_level": 2,
          "current_xp_within_level": 57,
          "xp_for_current_level": 100,
          "xp_for_next_level": 215,
          "xp_to_next_level": 58,
          "progress_percentage": 50,
          "is_max_level": false
        }
        "###);
    }
}
