use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult};
use pairpool_shared::types::api::ApiResponse;

use crate::services::match_service::{self, CleanupStats};
use crate::AppState;

/// DELETE /internal/cleanup/pools/:pool_id/users/:user_id
///
/// Service-to-service endpoint mirroring the member.removed subscriber:
/// drops the user's non-accepted matches in the pool and reports counts.
pub async fn cleanup_user_matches(
    State(state): State<Arc<AppState>>,
    Path((pool_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<CleanupStats>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let stats = match_service::cleanup_user_matches(&mut conn, pool_id, user_id)?;

    tracing::info!(
        pool_id = %pool_id,
        user_id = %user_id,
        matches_deleted = stats.matches_deleted,
        decisions_deleted = stats.decisions_deleted,
        "cleanup completed"
    );

    Ok(Json(ApiResponse::ok(stats)))
}
