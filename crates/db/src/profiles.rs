//! Profile queries
//!
//! The profiles row is the single source of truth for XP, streak and
//! aggregate counters. XP and counter updates are single-statement
//! atomic increments; the cached level columns are written in a
//! follow-up derived step and may be briefly stale under concurrency.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::models::{GamificationProfile, Module, ProfileStats, Streak};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

/// Get a profile by user id, assembled with module counters and unlocks
pub async fn get(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
) -> Result<Option<GamificationProfile>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT level, experience, experience_to_next_level,
               streak_current, streak_longest, streak_last_activity,
               total_xp, active_days, created_at, updated_at
        FROM profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let module_activity = module_counts(pool, user_id).await?;
    let achievements = crate::unlocks::list_achievements(pool, user_id).await?;
    let badges = crate::unlocks::list_badges(pool, user_id).await?;

    Ok(Some(GamificationProfile {
        user_id,
        level: row.get("level"),
        experience: row.get("experience"),
        experience_to_next_level: row.get("experience_to_next_level"),
        streak: Streak {
            current: row.get("streak_current"),
            longest: row.get("streak_longest"),
            last_activity: row.get("streak_last_activity"),
        },
        achievements,
        badges,
        stats: ProfileStats {
            total_xp: row.get("total_xp"),
            active_days: row.get("active_days"),
            module_activity,
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

/// Get or lazily create a profile.
///
/// Safe under concurrent first-touch: creation goes through
/// `INSERT OR IGNORE` against the unique user_id key, so the losing
/// writer falls through to the fetch instead of failing.
pub async fn get_or_create(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
) -> Result<GamificationProfile, sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO profiles
            (user_id, level, experience, experience_to_next_level,
             streak_current, streak_longest, total_xp, active_days,
             created_at, updated_at)
        VALUES (?, 1, 0, 100, 0, 0, 0, 0, ?, ?)
        "#,
    )
    .bind(user_id.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get(pool, user_id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Atomically add XP, returning the new cumulative experience.
///
/// Level recomputation is a separate derived write; see [`set_level`].
pub async fn add_xp(pool: &Pool<Sqlite>, user_id: Uuid, delta: i64) -> Result<i64, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET experience = experience + ?,
            total_xp = total_xp + ?,
            updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(delta)
    .bind(delta)
    .bind(Utc::now())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    sqlx::query_scalar("SELECT experience FROM profiles WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(pool)
        .await
}

/// Current cumulative experience
pub async fn experience(pool: &Pool<Sqlite>, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT experience FROM profiles WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(pool)
        .await
}

/// Write the cached level columns derived from current experience
pub async fn set_level(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    level: i32,
    experience_to_next_level: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET level = ?, experience_to_next_level = ?, updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(level)
    .bind(experience_to_next_level)
    .bind(Utc::now())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist an advanced streak; bumps active_days when the activity
/// landed on a new UTC day
pub async fn update_streak(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    streak: &Streak,
    new_active_day: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET streak_current = ?,
            streak_longest = ?,
            streak_last_activity = ?,
            active_days = active_days + ?,
            updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(streak.current)
    .bind(streak.longest)
    .bind(streak.last_activity)
    .bind(i64::from(new_active_day))
    .bind(Utc::now())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Atomically bump a per-module activity counter
pub async fn increment_module_activity(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
    module: Module,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO module_activity (user_id, module, activity_count)
        VALUES (?, ?, 1)
        ON CONFLICT (user_id, module)
        DO UPDATE SET activity_count = activity_count + 1
        "#,
    )
    .bind(user_id.to_string())
    .bind(module.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-module activity counts for a user
pub async fn module_counts(
    pool: &Pool<Sqlite>,
    user_id: Uuid,
) -> Result<BTreeMap<Module, i64>, sqlx::Error> {
    let rows = sqlx::query("SELECT module, activity_count FROM module_activity WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let name: String = row.get("module");
        if let Some(module) = Module::parse(&name) {
            counts.insert(module, row.get::<i64, _>("activity_count"));
        }
    }
    Ok(counts)
}

/// A profile's level-relevant columns, for the resync pass
#[derive(Debug, Clone)]
pub struct LevelRow {
    pub user_id: Uuid,
    pub experience: i64,
    pub level: i32,
    pub experience_to_next_level: i64,
}

/// All profiles' level columns
pub async fn level_rows(pool: &Pool<Sqlite>) -> Result<Vec<LevelRow>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT user_id, experience, level, experience_to_next_level FROM profiles",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let user_id: String = row.get("user_id");
            Ok(LevelRow {
                user_id: crate::parse_uuid(&user_id)?,
                experience: row.get("experience"),
                level: row.get("level"),
                experience_to_next_level: row.get("experience_to_next_level"),
            })
        })
        .collect()
}

/// Number of profiles
pub async fn count(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool)
        .await
}
