//! Achievement and badge unlock rows
//!
//! Unlock rows are append-only and unique per (user, id). Insertion uses
//! `INSERT OR IGNORE`; rows_affected is the single source of truth for
//! "newly unlocked", which makes grants idempotent under retries and
//! concurrent evaluation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::models::UnlockRecord;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

/// Record an achievement unlock; returns true if newly unlocked
pub async fn insert_achievement(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    achievement_id: &str,
    unlocked_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO profile_achievements (user_id, achievement_id, unlocked_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id.to_string())
    .bind(achievement_id)
    .bind(unlocked_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Record a badge unlock; returns true if newly unlocked
pub async fn insert_badge(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    badge_id: &str,
    unlocked_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO profile_badges (user_id, badge_id, unlocked_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id.to_string())
    .bind(badge_id)
    .bind(unlocked_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// All achievement unlocks for a user, oldest first
pub async fn list_achievements(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
) -> Result<Vec<UnlockRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT achievement_id, unlocked_at
        FROM profile_achievements
        WHERE user_id = ?
        ORDER BY unlocked_at ASC, achievement_id ASC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| UnlockRecord {
            id: r.get("achievement_id"),
            unlocked_at: r.get("unlocked_at"),
        })
        .collect())
}

/// All badge unlocks for a user, oldest first
pub async fn list_badges(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
) -> Result<Vec<UnlockRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT badge_id, unlocked_at
        FROM profile_badges
        WHERE user_id = ?
        ORDER BY unlocked_at ASC, badge_id ASC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| UnlockRecord {
            id: r.get("badge_id"),
            unlocked_at: r.get("unlocked_at"),
        })
        .collect())
}

/// How many users have unlocked each achievement
pub async fn achievement_unlock_counts(
    pool: &Pool<Sqlite>,
) -> Result<BTreeMap<String, i64>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT achievement_id, COUNT(*) AS unlocks FROM profile_achievements GROUP BY achievement_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.get("achievement_id"), r.get::<i64, _>("unlocks")))
        .collect())
}
