//! Profile routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;
use common::models::{ActivityLogEntry, GamificationProfile};

/// Get a user's gamification profile
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<GamificationProfile>> {
    let profile = db::profiles::get(&state.pool, user_id)
        .await
        .db_err()?
        .not_found(format!("No profile for user {}", user_id))?;

    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    25
}

/// Recent activity-log entries for a user, newest first
pub async fn activity(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityLogEntry>>> {
    let limit = query.limit.clamp(1, 100);
    let entries = db::activity::recent_for_user(&state.pool, user_id, limit)
        .await
        .db_err()?;

    Ok(Json(entries))
}
