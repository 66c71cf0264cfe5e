use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult, ErrorCode};
use pairpool_shared::types::api::ApiResponse;

use crate::events::publisher;
use crate::models::{Match, MatchStatus};
use crate::services::decision_engine::{self, DecisionSummary};
use crate::services::match_service;
use crate::AppState;

// --- Request / query types ---

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub pool_id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListMatchesQuery {
    pub pool_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OverrideStatusRequest {
    pub status: String,
}

// --- Handlers ---

/// POST /matches
///
/// 201 with a fresh `waiting` match, or 200 with the existing `waiting` match
/// for the same pair (idempotent create).
pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMatchRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Match>>)> {
    let (user_a, user_b) = match_service::validate_pair(req.user1_id, req.user2_id)?;

    for user_id in [user_a, user_b] {
        if !state.pool_client.is_member(req.pool_id, user_id).await? {
            return Err(AppError::with_details(
                ErrorCode::ParticipantNotInPool,
                "user is not a member of this pool",
                serde_json::json!({ "pool_id": req.pool_id, "user_id": user_id }),
            ));
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let (match_row, created) = match_service::create_match(&mut conn, req.pool_id, user_a, user_b)?;

    if created {
        tracing::info!(match_id = %match_row.id, pool_id = %req.pool_id, "match created");
        publisher::publish_match_created(&state.rabbitmq, &match_row).await;
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(ApiResponse::ok(match_row))))
}

/// GET /matches/:id
pub async fn get_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let match_row = match_service::get_match(&mut conn, match_id)?;
    Ok(Json(ApiResponse::ok(match_row)))
}

/// GET /matches?pool_id=&user_id=&status=
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMatchesQuery>,
) -> AppResult<Json<ApiResponse<Vec<Match>>>> {
    let status = match &query.status {
        Some(raw) => Some(MatchStatus::parse(raw).ok_or_else(|| {
            AppError::new(ErrorCode::InvalidStatus, format!("invalid status filter \"{raw}\""))
        })?),
        None => None,
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows = match_service::list_matches(&mut conn, query.pool_id, query.user_id, status)?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// PATCH /matches/:id - administrative status override.
pub async fn override_status(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
    Json(req): Json<OverrideStatusRequest>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let status = MatchStatus::parse(&req.status).ok_or_else(|| {
        AppError::new(ErrorCode::InvalidStatus, format!("invalid status \"{}\"", req.status))
    })?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let match_row = match_service::set_status(&mut conn, match_id, status)?;

    tracing::info!(match_id = %match_id, status = status.as_str(), "match status overridden");

    Ok(Json(ApiResponse::ok(match_row)))
}

/// DELETE /matches/:id
pub async fn delete_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    match_service::delete_match(&mut conn, match_id)?;

    tracing::info!(match_id = %match_id, "match deleted");

    Ok(Json(ApiResponse::ok(serde_json::json!({ "deleted": match_id }))))
}

/// GET /matches/:id/decisions/summary
pub async fn decision_summary(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DecisionSummary>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let summary = decision_engine::decision_summary(&mut conn, match_id)?;

    Ok(Json(ApiResponse::ok(summary)))
}
