#[cfg(test)]
mod tests {
    use crate::curve::{level_for_experience, threshold_for_level};

    #[test]
    fn test_zero_xp_is_level_one() {
        let info = level_for_experience(0);
        assert_eq!(info.level, 1);
        assert_eq!(info.xp_to_next, 100);
    }

    #[test]
    fn test_negative_xp_treated_as_zero() {
        assert_eq!(level_for_experience(-50), level_for_experience(0));
    }

    #[test]
    fn test_level_boundaries() {
        // Level 2 starts at 100, level 3 at 400, level 4 at 900
        assert_eq!(level_for_experience(99).level, 1);
        assert_eq!(level_for_experience(100).level, 2);
        assert_eq!(level_for_experience(399).level, 2);
        assert_eq!(level_for_experience(400).level, 3);
        assert_eq!(level_for_experience(899).level, 3);
        assert_eq!(level_for_experience(900).level, 4);
    }

    #[test]
    fn test_xp_to_next_is_exact() {
        // At 150 XP (level 2), level 3 needs 400
        let info = level_for_experience(150);
        assert_eq!(info.level, 2);
        assert_eq!(info.xp_to_next, 250);

        // Exactly on a threshold
        let info = level_for_experience(400);
        assert_eq!(info.level, 3);
        assert_eq!(info.xp_to_next, 500);
    }

    #[test]
    fn test_thresholds_match_curve() {
        for level in 1..=50 {
            let threshold = threshold_for_level(level);
            assert_eq!(level_for_experience(threshold).level, level);
            if threshold > 0 {
                assert_eq!(level_for_experience(threshold - 1).level, level - 1);
            }
        }
    }

    #[test]
    fn test_monotonic_over_xp() {
        let mut prev_level = 0;
        for xp in (0..20_000).step_by(7) {
            let info = level_for_experience(xp);
            assert!(info.level >= prev_level, "level dropped at xp={xp}");
            assert!(info.xp_to_next > 0);
            prev_level = info.level;
        }
    }

    #[test]
    fn test_each_level_costs_more_than_the_last() {
        for level in 2..=30 {
            let prev_gap = threshold_for_level(level) - threshold_for_level(level - 1);
            let next_gap = threshold_for_level(level + 1) - threshold_for_level(level);
            assert!(next_gap > prev_gap);
        }
    }
}
