//! Activity log queries
//!
//! The activity log is append-only: rows are inserted once and never
//! updated or deleted. It backs auditing, recent-activity reads and the
//! period-scoped leaderboards.

use chrono::{DateTime, Utc};
use common::models::{ActivityLogEntry, Module};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

/// Append one entry to the activity log
pub async fn append(pool: &Pool<Sqlite>, entry: &ActivityLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO activity_log (user_id, module, activity_type, xp_earned, metadata, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.user_id.to_string())
    .bind(entry.module.as_str())
    .bind(&entry.activity_type)
    .bind(entry.xp_earned)
    .bind(entry.metadata.to_string())
    .bind(entry.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent entries for a user, newest first
pub async fn recent_for_user(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT module, activity_type, xp_earned, metadata, created_at
        FROM activity_log
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let entries = rows
        .into_iter()
        .filter_map(|row| {
            let module: String = row.get("module");
            let metadata: Option<String> = row.get("metadata");
            Some(ActivityLogEntry {
                user_id,
                module: Module::parse(&module)?,
                activity_type: row.get("activity_type"),
                xp_earned: row.get("xp_earned"),
                metadata: metadata
                    .and_then(|m| serde_json::from_str(&m).ok())
                    .unwrap_or(serde_json::Value::Null),
                created_at: row.get("created_at"),
            })
        })
        .collect();

    Ok(entries)
}

/// Per-user XP totals from the log since a cutoff, highest first.
///
/// Ties are ordered by user id so the output is deterministic.
pub async fn xp_totals_since(
    pool: &Pool<Sqlite>,
    since: DateTime<Utc>,
    module: Option<Module>,
    limit: i64,
) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
    let rows = match module {
        Some(module) => {
            sqlx::query(
                r#"
                SELECT user_id, SUM(xp_earned) AS xp
                FROM activity_log
                WHERE created_at >= ? AND module = ?
                GROUP BY user_id
                HAVING SUM(xp_earned) > 0
                ORDER BY xp DESC, user_id ASC
                LIMIT ?
                "#,
            )
            .bind(since)
            .bind(module.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT user_id, SUM(xp_earned) AS xp
                FROM activity_log
                WHERE created_at >= ?
                GROUP BY user_id
                HAVING SUM(xp_earned) > 0
                ORDER BY xp DESC, user_id ASC
                LIMIT ?
                "#,
            )
            .bind(since)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    rows.into_iter()
        .map(|row| {
            let user_id: String = row.get("user_id");
            Ok((crate::parse_uuid(&user_id)?, row.get::<i64, _>("xp")))
        })
        .collect()
}

/// Total entries recorded for a user
pub async fn count_for_user(pool: &Pool<Sqlite>, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM activity_log WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(pool)
        .await
}
