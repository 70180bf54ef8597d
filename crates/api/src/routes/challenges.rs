//! Challenge routes

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use common::models::ChallengeSet;

/// Current daily and weekly challenge sets for a user, regenerating any
/// that have expired
pub async fn for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ChallengeSet>>> {
    let sets = state
        .tracker
        .current_sets(user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(sets))
}
