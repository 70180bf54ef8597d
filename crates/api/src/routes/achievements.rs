//! Achievement routes

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;
use common::models::{AchievementCategory, BadgeTier};
use engine::catalog::{ProfileSnapshot, ACHIEVEMENTS, BADGES};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAchievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: i64,
    /// How many users hold this achievement
    pub unlock_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBadge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: BadgeTier,
    pub xp_reward: i64,
}

#[derive(Serialize)]
pub struct CategoryGroup {
    pub name: &'static str,
    pub achievements: Vec<CatalogAchievement>,
}

/// Grouped achievements plus the badge ladder
#[derive(Serialize)]
pub struct AchievementCatalog {
    pub total: usize,
    pub categories: Vec<CategoryGroup>,
    pub badges: Vec<CatalogBadge>,
}

fn category_name(category: AchievementCategory) -> &'static str {
    match category {
        AchievementCategory::Milestone => "Milestone",
        AchievementCategory::Streak => "Streak",
        AchievementCategory::Mastery => "Mastery",
        AchievementCategory::Special => "Special",
    }
}

/// List the full catalog, achievements grouped by category
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<AchievementCatalog>> {
    let unlock_counts = db::unlocks::achievement_unlock_counts(&state.pool)
        .await
        .db_err()?;

    let categories = [
        AchievementCategory::Milestone,
        AchievementCategory::Streak,
        AchievementCategory::Mastery,
        AchievementCategory::Special,
    ]
    .into_iter()
    .map(|category| CategoryGroup {
        name: category_name(category),
        achievements: ACHIEVEMENTS
            .iter()
            .filter(|a| a.category == category)
            .map(|a| CatalogAchievement {
                id: a.id,
                name: a.name,
                description: a.description,
                icon: a.icon,
                xp_reward: a.xp_reward,
                unlock_count: unlock_counts.get(a.id).copied().unwrap_or(0),
            })
            .collect(),
    })
    .filter(|group| !group.achievements.is_empty())
    .collect();

    let badges = BADGES
        .iter()
        .map(|b| CatalogBadge {
            id: b.id,
            name: b.name,
            description: b.description,
            icon: b.icon,
            tier: b.tier,
            xp_reward: b.xp_reward,
        })
        .collect();

    Ok(Json(AchievementCatalog {
        total: ACHIEVEMENTS.len(),
        categories,
        badges,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: i64,
    pub current: i64,
    pub target: i64,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// A user's progress toward every achievement in the catalog
pub async fn user_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AchievementProgress>>> {
    let profile = db::profiles::get(&state.pool, user_id)
        .await
        .db_err()?
        .not_found(format!("No profile for user {}", user_id))?;

    let snapshot = ProfileSnapshot {
        level: profile.level,
        total_xp: profile.stats.total_xp,
        streak_current: profile.streak.current,
        total_activities: profile.stats.module_activity.values().sum(),
        module_activities: profile.stats.module_activity.clone(),
    };

    let progress = ACHIEVEMENTS
        .iter()
        .map(|def| {
            let (current, target) = def.requirement.progress(&snapshot);
            let unlocked_at = profile
                .achievements
                .iter()
                .find(|a| a.id == def.id)
                .map(|a| a.unlocked_at);
            AchievementProgress {
                id: def.id,
                name: def.name,
                description: def.description,
                icon: def.icon,
                xp_reward: def.xp_reward,
                current: current.min(target),
                target,
                unlocked: unlocked_at.is_some(),
                unlocked_at,
            }
        })
        .collect();

    Ok(Json(progress))
}
