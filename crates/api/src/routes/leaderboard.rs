//! Leaderboard routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult, DbResultExt};
use crate::state::AppState;
use common::models::{LeaderboardCategory, LeaderboardEntry, LeaderboardPeriod, Module};

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    /// Time period: "week", "month", "all"
    #[serde(default = "default_period")]
    period: String,
    /// Ranking category: "xp", "level", "streak"
    #[serde(default = "default_category")]
    category: String,
    /// Optional module filter (xp category only)
    module: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_period() -> String {
    "all".to_string()
}

fn default_category() -> String {
    "xp".to_string()
}

fn default_limit() -> i64 {
    25
}

pub async fn global(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let period = LeaderboardPeriod::parse(&query.period)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown period: {}", query.period)))?;
    let category = LeaderboardCategory::parse(&query.category)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown category: {}", query.category)))?;
    let module = match &query.module {
        Some(name) => Some(
            Module::parse(name)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown module: {name}")))?,
        ),
        None => None,
    };
    let limit = query.limit.clamp(1, 100);

    let entries = db::leaderboard::get(&state.pool, period, category, module, limit)
        .await
        .db_err()?;

    Ok(Json(entries))
}
