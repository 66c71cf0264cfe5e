use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult, ErrorCode};
use pairpool_shared::types::api::ApiResponse;

use crate::events::publisher;
use crate::models::{DecisionValue, MatchDecision, MatchStatus};
use crate::services::decision_engine;
use crate::AppState;

// --- Request / query types ---

#[derive(Debug, Deserialize)]
pub struct SubmitDecisionRequest {
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub decision: String,
}

#[derive(Debug, Deserialize)]
pub struct ListDecisionsQuery {
    pub match_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

// --- Handlers ---

/// POST /decisions
pub async fn submit_decision(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitDecisionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MatchDecision>>)> {
    let value = DecisionValue::parse(&req.decision).ok_or_else(|| {
        AppError::new(
            ErrorCode::InvalidDecision,
            format!("decision must be \"accept\" or \"reject\", got \"{}\"", req.decision),
        )
    })?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let outcome = decision_engine::submit_decision(&mut conn, req.match_id, req.user_id, value)?;

    tracing::info!(
        match_id = %req.match_id,
        user_id = %req.user_id,
        decision = value.as_str(),
        status = %outcome.match_row.status,
        "decision recorded"
    );

    publisher::publish_decision_recorded(&state.rabbitmq, req.match_id, req.user_id, value).await;

    let status = MatchStatus::parse(&outcome.match_row.status);
    if status != Some(outcome.previous_status) && status != Some(MatchStatus::Waiting) {
        publisher::publish_match_resolved(
            &state.rabbitmq,
            outcome.match_row.id,
            outcome.match_row.pool_id,
            &outcome.match_row.status,
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome.decision))))
}

/// GET /decisions?match_id=&user_id=
pub async fn list_decisions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDecisionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<MatchDecision>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let decisions = decision_engine::list_decisions(&mut conn, query.match_id, query.user_id)?;

    Ok(Json(ApiResponse::ok(decisions)))
}
