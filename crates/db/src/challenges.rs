//! Challenge set persistence
//!
//! One set row per (user, period) with its items keyed by position.
//! Progress updates are SQL-level capped increments; the completed flag
//! flips under a `completed = 0` guard so the bonus is granted exactly
//! once even under concurrent matching activity.

use chrono::{DateTime, Utc};
use common::models::{ChallengeItem, ChallengePeriod, ChallengeSet, Module};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

fn item_from_row(row: &SqliteRow) -> Option<ChallengeItem> {
    let module: String = row.get("module");
    Some(ChallengeItem {
        id: row.get("challenge_id"),
        description: row.get("description"),
        module: Module::parse(&module)?,
        activity_type: row.get("activity_type"),
        target: row.get("target"),
        progress: row.get("progress"),
        completed: row.get::<i64, _>("completed") == 1,
        xp_reward: row.get("xp_reward"),
    })
}

/// Load a user's challenge set for one period, items in position order
pub async fn get_set(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    period: ChallengePeriod,
) -> Result<Option<ChallengeSet>, sqlx::Error> {
    let set_row = sqlx::query(
        "SELECT refreshed_at, expires_at FROM challenge_sets WHERE user_id = ? AND period = ?",
    )
    .bind(user_id.to_string())
    .bind(period.as_str())
    .fetch_optional(pool)
    .await?;

    let Some(set_row) = set_row else {
        return Ok(None);
    };

    let item_rows = sqlx::query(
        r#"
        SELECT challenge_id, description, module, activity_type,
               target, progress, completed, xp_reward
        FROM challenge_items
        WHERE user_id = ? AND period = ?
        ORDER BY position ASC
        "#,
    )
    .bind(user_id.to_string())
    .bind(period.as_str())
    .fetch_all(pool)
    .await?;

    Ok(Some(ChallengeSet {
        period,
        refreshed_at: set_row.get("refreshed_at"),
        expires_at: set_row.get("expires_at"),
        challenges: item_rows.iter().filter_map(item_from_row).collect(),
    }))
}

/// Replace a user's challenge set for one period atomically
pub async fn replace_set(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    set: &ChallengeSet,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM challenge_items WHERE user_id = ? AND period = ?")
        .bind(user_id.to_string())
        .bind(set.period.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM challenge_sets WHERE user_id = ? AND period = ?")
        .bind(user_id.to_string())
        .bind(set.period.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO challenge_sets (user_id, period, refreshed_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id.to_string())
    .bind(set.period.as_str())
    .bind(set.refreshed_at)
    .bind(set.expires_at)
    .execute(&mut *tx)
    .await?;

    for (position, item) in set.challenges.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO challenge_items
                (user_id, period, position, challenge_id, description, module,
                 activity_type, target, progress, completed, xp_reward)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(set.period.as_str())
        .bind(position as i64)
        .bind(&item.id)
        .bind(&item.description)
        .bind(item.module.as_str())
        .bind(&item.activity_type)
        .bind(item.target)
        .bind(item.progress)
        .bind(i64::from(item.completed))
        .bind(item.xp_reward)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Increment progress on matching incomplete items, capped at target.
///
/// Matches on module, and on activity type when the item carries one.
/// Returns the number of items touched.
pub async fn increment_progress(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    period: ChallengePeriod,
    module: Module,
    activity_type: &str,
    amount: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE challenge_items
        SET progress = MIN(target, progress + ?)
        WHERE user_id = ? AND period = ? AND completed = 0
          AND module = ?
          AND (activity_type IS NULL OR activity_type = ?)
        "#,
    )
    .bind(amount)
    .bind(user_id.to_string())
    .bind(period.as_str())
    .bind(module.as_str())
    .bind(activity_type)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Flip items that reached their target to completed, exactly once each.
///
/// The `completed = 0` guard in the update makes the transition
/// single-shot: a row someone else already flipped is skipped.
pub async fn take_completed(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    period: ChallengePeriod,
) -> Result<Vec<ChallengeItem>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT position, challenge_id, description, module, activity_type,
               target, progress, completed, xp_reward
        FROM challenge_items
        WHERE user_id = ? AND period = ? AND completed = 0 AND progress >= target
        ORDER BY position ASC
        "#,
    )
    .bind(user_id.to_string())
    .bind(period.as_str())
    .fetch_all(pool)
    .await?;

    let mut completed = Vec::new();
    for row in rows {
        let position: i64 = row.get("position");
        let result = sqlx::query(
            r#"
            UPDATE challenge_items
            SET completed = 1
            WHERE user_id = ? AND period = ? AND position = ? AND completed = 0
            "#,
        )
        .bind(user_id.to_string())
        .bind(period.as_str())
        .bind(position)
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            if let Some(mut item) = item_from_row(&row) {
                item.completed = true;
                completed.push(item);
            }
        }
    }

    Ok(completed)
}

/// Delete expired challenge sets and their items; returns sets removed
pub async fn delete_expired(pool: &Pool<Sqlite>, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM challenge_items
        WHERE (user_id, period) IN
            (SELECT user_id, period FROM challenge_sets WHERE expires_at <= ?)
        "#,
    )
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM challenge_sets WHERE expires_at <= ?")
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}
