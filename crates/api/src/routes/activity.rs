//! Activity recording routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use common::models::Module;
use engine::challenges::ChallengeOutcome;
use engine::recorder::ActivityOutcome;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordActivityRequest {
    pub user_id: Uuid,
    pub module: String,
    pub activity_type: String,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Serialize)]
pub struct RecordActivityResponse {
    #[serde(flatten)]
    pub outcome: ActivityOutcome,
    pub challenges: ChallengeOutcome,
}

/// Record a completed activity and apply challenge bookkeeping.
///
/// Challenge tracking is best-effort: a tracker failure is logged and
/// the response carries an empty challenge section instead of failing
/// the recording.
pub async fn record(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordActivityRequest>,
) -> ApiResult<Json<RecordActivityResponse>> {
    let module = Module::parse(&req.module)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown module: {}", req.module)))?;

    let outcome = state
        .recorder
        .record(req.user_id, module, &req.activity_type, &req.metadata)
        .await
        .map_err(ApiError::from)?;

    let challenges = match state
        .tracker
        .update_progress(req.user_id, module, &req.activity_type, &req.metadata)
        .await
    {
        Ok(challenges) => challenges,
        Err(e) => {
            warn!(user_id = %req.user_id, error = %e, "challenge tracking failed");
            ChallengeOutcome::default()
        }
    };

    Ok(Json(RecordActivityResponse {
        outcome,
        challenges,
    }))
}
