//! Experience curve
//!
//! `level = isqrt(experience / 100) + 1`: the cumulative threshold for
//! level L is `100 * (L - 1)^2`, so each level costs 200 XP more than
//! the one before it (100, 300, 500, ...). The curve is fixed; stored
//! profiles cache the level it produces, so changing these coefficients
//! is a breaking change that requires a [`crate::resync`] pass over
//! every profile.

/// A level and the XP remaining to reach the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: i32,
    pub xp_to_next: i64,
}

const XP_PER_LEVEL_STEP: i64 = 100;

/// Map cumulative experience to a level. Pure, total and monotonic;
/// negative input is treated as zero.
pub fn level_for_experience(experience: i64) -> LevelInfo {
    let xp = experience.max(0);
    let level = (xp / XP_PER_LEVEL_STEP).isqrt() + 1;
    LevelInfo {
        level: level as i32,
        xp_to_next: XP_PER_LEVEL_STEP * level * level - xp,
    }
}

/// Cumulative XP required to reach a level
pub fn threshold_for_level(level: i32) -> i64 {
    let steps = i64::from(level.max(1)) - 1;
    XP_PER_LEVEL_STEP * steps * steps
}
