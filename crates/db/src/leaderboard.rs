//! Leaderboard queries
//!
//! Rankings are dense and 1-based, ties broken by user id ascending so
//! repeated reads of the same data produce identical output.

use chrono::{DateTime, Duration, Utc};
use common::models::{LeaderboardCategory, LeaderboardEntry, LeaderboardPeriod, Module};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

/// Get a leaderboard for a period and category, optionally module-scoped.
///
/// The xp category sums the activity log over the period window; level
/// and streak rank current profile state and ignore the period.
pub async fn get(
    pool: &Pool<Sqlite>,
    period: LeaderboardPeriod,
    category: LeaderboardCategory,
    module: Option<Module>,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = match category {
        LeaderboardCategory::Xp => xp_rows(pool, period, module, limit).await?,
        LeaderboardCategory::Level => profile_rows(pool, "level", limit).await?,
        LeaderboardCategory::Streak => profile_rows(pool, "streak_current", limit).await?,
    };

    Ok(dense_rank(rows))
}

async fn xp_rows(
    pool: &Pool<Sqlite>,
    period: LeaderboardPeriod,
    module: Option<Module>,
    limit: i64,
) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
    // All-time unscoped xp is exactly profiles.total_xp; everything else
    // needs the activity log.
    if period == LeaderboardPeriod::AllTime && module.is_none() {
        return profile_rows(pool, "total_xp", limit).await;
    }

    let since = match period {
        LeaderboardPeriod::Week => Utc::now() - Duration::days(7),
        LeaderboardPeriod::Month => Utc::now() - Duration::days(30),
        LeaderboardPeriod::AllTime => DateTime::<Utc>::UNIX_EPOCH,
    };

    crate::activity::xp_totals_since(pool, since, module, limit).await
}

async fn profile_rows(
    pool: &Pool<Sqlite>,
    column: &str,
    limit: i64,
) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
    // column is one of our own identifiers, never caller input
    let sql = format!(
        "SELECT user_id, {column} AS value FROM profiles \
         WHERE {column} > 0 \
         ORDER BY value DESC, user_id ASC LIMIT ?"
    );

    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    rows.into_iter()
        .map(|row| {
            let user_id: String = row.get("user_id");
            Ok((crate::parse_uuid(&user_id)?, row.get::<i64, _>("value")))
        })
        .collect()
}

/// Assign dense 1-based ranks to rows already sorted by value descending
/// (ties by user id ascending)
pub fn dense_rank(rows: Vec<(Uuid, i64)>) -> Vec<LeaderboardEntry> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut rank = 0;
    let mut prev_value: Option<i64> = None;

    for (user_id, value) in rows {
        if prev_value != Some(value) {
            rank += 1;
            prev_value = Some(value);
        }
        entries.push(LeaderboardEntry {
            rank,
            user_id,
            value,
        });
    }

    entries
}
