//! Activity recording
//!
//! The single entry point other modules call when a user completes an
//! action. Orchestrates the XP apply, streak touch, module counters,
//! unlock evaluation and the audit-log append. Challenge bookkeeping is
//! deliberately not called from here; the api layer composes the
//! tracker inside its own failure boundary.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::ProfileSnapshot;
use crate::unlocks::UnlockEvaluator;
use crate::{curve, rewards, streak};
use common::models::{ActivityLogEntry, BadgeTier, Module};
use common::{Error, Result};

/// A newly unlocked achievement, shaped for UI toasts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub id: &'static str,
    pub name: &'static str,
    pub xp_reward: i64,
}

/// A newly unlocked badge, shaped for UI toasts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedBadge {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: BadgeTier,
}

/// Streak state after the activity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current: i32,
    pub longest: i32,
}

/// Result of recording one activity
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOutcome {
    pub xp_earned: i64,
    pub leveled_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<i32>,
    pub new_achievements: Vec<UnlockedAchievement>,
    pub new_badges: Vec<UnlockedBadge>,
    pub streak: StreakSummary,
}

/// Records activities and applies their rewards
pub struct ActivityRecorder {
    pool: Pool<Sqlite>,
    evaluator: UnlockEvaluator,
}

impl ActivityRecorder {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            evaluator: UnlockEvaluator::new(pool.clone()),
            pool,
        }
    }

    /// Record one completed activity for a user.
    ///
    /// Unknown (module, activity type) pairs fail with
    /// [`Error::InvalidActivity`] before any write. A failed audit-log
    /// append is logged and swallowed; losing an audit row is
    /// acceptable, losing XP is not.
    pub async fn record(
        &self,
        user_id: Uuid,
        module: Module,
        activity_type: &str,
        metadata: &Value,
    ) -> Result<ActivityOutcome> {
        let xp_earned = rewards::activity_xp(module, activity_type, metadata).ok_or_else(|| {
            Error::InvalidActivity {
                module: module.to_string(),
                activity_type: activity_type.to_string(),
            }
        })?;

        let profile = db::profiles::get_or_create(&self.pool, user_id)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        let now = Utc::now();

        // Atomic XP apply, then the derived level write
        let experience = db::profiles::add_xp(&self.pool, user_id, xp_earned)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        let mut level_info = curve::level_for_experience(experience);
        db::profiles::set_level(&self.pool, user_id, level_info.level, level_info.xp_to_next)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        // Streak and counters, applied before unlock evaluation so the
        // snapshot sees the post-activity state
        let (next_streak, change) = streak::advance(&profile.streak, now);
        db::profiles::update_streak(&self.pool, user_id, &next_streak, change.is_new_day())
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        db::profiles::increment_module_activity(&self.pool, user_id, module)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let module_activities = db::profiles::module_counts(&self.pool, user_id)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        let snapshot = ProfileSnapshot {
            level: level_info.level,
            total_xp: experience,
            streak_current: next_streak.current,
            total_activities: module_activities.values().sum(),
            module_activities,
        };

        let unlocked = self.evaluator.evaluate(user_id, module, &snapshot).await?;

        // Unlock rewards may push the level further
        if unlocked.xp_granted > 0 {
            let experience = db::profiles::experience(&self.pool, user_id)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            level_info = curve::level_for_experience(experience);
            db::profiles::set_level(&self.pool, user_id, level_info.level, level_info.xp_to_next)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
        }

        let leveled_up = level_info.level > profile.level;
        info!(
            user_id = %user_id,
            module = %module,
            activity_type,
            xp_earned,
            leveled_up,
            "activity recorded"
        );

        let entry = ActivityLogEntry {
            user_id,
            module,
            activity_type: activity_type.to_string(),
            xp_earned,
            metadata: metadata.clone(),
            created_at: now,
        };
        if let Err(e) = db::activity::append(&self.pool, &entry).await {
            warn!(user_id = %user_id, error = %e, "activity log append failed");
        }

        Ok(ActivityOutcome {
            xp_earned,
            leveled_up,
            new_level: leveled_up.then_some(level_info.level),
            new_achievements: unlocked
                .achievements
                .iter()
                .map(|a| UnlockedAchievement {
                    id: a.id,
                    name: a.name,
                    xp_reward: a.xp_reward,
                })
                .collect(),
            new_badges: unlocked
                .badges
                .iter()
                .map(|b| UnlockedBadge {
                    id: b.id,
                    name: b.name,
                    tier: b.tier,
                })
                .collect(),
            streak: StreakSummary {
                current: next_streak.current,
                longest: next_streak.longest,
            },
        })
    }
}
