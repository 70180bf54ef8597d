//! Level resync routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncResponse {
    pub status: String,
    pub profiles_checked: usize,
    pub profiles_updated: usize,
}

/// Recompute every profile's cached level from the experience curve
pub async fn trigger(State(state): State<Arc<AppState>>) -> ApiResult<Json<ResyncResponse>> {
    info!("Level resync triggered via API");

    let stats = engine::resync::sync_levels(&state.pool)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ResyncResponse {
        status: "complete".to_string(),
        profiles_checked: stats.profiles_checked,
        profiles_updated: stats.profiles_updated,
    }))
}
