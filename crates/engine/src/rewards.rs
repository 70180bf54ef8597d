//! XP reward table
//!
//! Base XP is a fixed lookup over (module, activity type); a pair absent
//! from the table is an invalid activity. Metadata can add a bounded
//! score bonus, and the total grant per call is clamped to
//! [`MAX_ACTIVITY_XP`] so no caller-supplied value can mint unbounded XP.

use common::models::Module;
use serde_json::Value;

/// Hard ceiling on XP granted by a single recorded activity
pub const MAX_ACTIVITY_XP: i64 = 100;

/// Largest progress quantity a single activity can contribute to a
/// challenge
pub const MAX_PROGRESS_AMOUNT: i64 = 50;

/// Base XP for a (module, activity type) pair; `None` means the pair is
/// not a recognized activity
pub fn base_xp(module: Module, activity_type: &str) -> Option<i64> {
    use Module::*;

    let xp = match (module, activity_type) {
        (Reading, "complete_exercise") => 20,
        (Reading, "quiz_passed") => 15,
        (Reading, "finish_book") => 50,
        (Writing, "complete_exercise") => 20,
        (Writing, "submit_essay") => 30,
        (Listening, "complete_exercise") => 15,
        (Listening, "complete_session") => 20,
        (Speaking, "complete_session") => 25,
        (Speaking, "conversation") => 20,
        (Vocabulary, "flashcard_review") => 5,
        (Vocabulary, "complete_exercise") => 15,
        (Vocabulary, "word_mastered") => 10,
        (Grammar, "complete_exercise") => 15,
        (Grammar, "complete_lesson") => 20,
        (Grammar, "daily_challenge") => 25,
        (Games, "complete_game") => 10,
        (Games, "win_game") => 15,
        _ => return None,
    };

    Some(xp)
}

/// Bonus XP from a metadata `score` field (0-100 scale, out-of-range
/// values clamped)
pub fn score_bonus(metadata: &Value) -> i64 {
    match metadata.get("score").and_then(Value::as_i64) {
        Some(score) => score.clamp(0, 100) / 5,
        None => 0,
    }
}

/// Total XP for one recorded activity: base plus score bonus, capped
pub fn activity_xp(module: Module, activity_type: &str, metadata: &Value) -> Option<i64> {
    base_xp(module, activity_type).map(|base| (base + score_bonus(metadata)).min(MAX_ACTIVITY_XP))
}

/// Challenge progress contributed by one activity. Defaults to 1; a
/// metadata `count` (e.g. words written) raises it, bounded to
/// [`MAX_PROGRESS_AMOUNT`].
pub fn progress_amount(metadata: &Value) -> i64 {
    match metadata.get("count").and_then(Value::as_i64) {
        Some(count) => count.clamp(1, MAX_PROGRESS_AMOUNT),
        None => 1,
    }
}
