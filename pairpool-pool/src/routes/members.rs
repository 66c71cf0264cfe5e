use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult, ErrorCode};
use pairpool_shared::types::api::ApiResponse;
use pairpool_shared::types::pagination::{Page, PageParams};

use crate::events::publisher;
use crate::models::{NewPoolMember, PoolMember};
use crate::schema::{pool_members, pools};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

fn ensure_pool_exists(conn: &mut PgConnection, pool_id: Uuid) -> AppResult<()> {
    let exists: bool = pools::table
        .find(pool_id)
        .count()
        .get_result::<i64>(conn)
        .map(|c| c > 0)?;

    if !exists {
        return Err(AppError::new(ErrorCode::PoolNotFound, "pool not found"));
    }
    Ok(())
}

/// POST /pools/:id/members
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PoolMember>>)> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_pool_exists(&mut conn, pool_id)?;

    let existing = pool_members::table
        .find((pool_id, req.user_id))
        .first::<PoolMember>(&mut conn)
        .optional()?;

    if existing.is_some() {
        return Err(AppError::new(
            ErrorCode::MemberAlreadyExists,
            "user is already a member of this pool",
        ));
    }

    let member: PoolMember = diesel::insert_into(pool_members::table)
        .values(&NewPoolMember {
            pool_id,
            user_id: req.user_id,
        })
        .get_result(&mut conn)?;

    publisher::publish_member_added(&state.rabbitmq, pool_id, req.user_id).await;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(member))))
}

/// DELETE /pools/:id/members/:user_id
///
/// The matching service subscribes to member.removed and drops the user's
/// non-accepted matches in this pool.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((pool_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_pool_exists(&mut conn, pool_id)?;

    let deleted = diesel::delete(pool_members::table.find((pool_id, user_id)))
        .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::new(
            ErrorCode::MemberNotFound,
            "user is not a member of this pool",
        ));
    }

    tracing::info!(pool_id = %pool_id, user_id = %user_id, "pool member removed");

    publisher::publish_member_removed(&state.rabbitmq, pool_id, user_id).await;

    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "pool_id": pool_id, "user_id": user_id }),
    )))
}

/// GET /pools/:id/members
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Page<PoolMember>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_pool_exists(&mut conn, pool_id)?;

    let total: i64 = pool_members::table
        .filter(pool_members::pool_id.eq(pool_id))
        .count()
        .get_result(&mut conn)?;

    let members = pool_members::table
        .filter(pool_members::pool_id.eq(pool_id))
        .order(pool_members::joined_at.asc())
        .offset(page.offset())
        .limit(page.limit())
        .load::<PoolMember>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Page::new(members, total, &page))))
}

/// GET /pools/:id/members/:user_id
///
/// Membership lookup consumed by the matching service before creating a match.
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path((pool_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<PoolMember>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let member = pool_members::table
        .find((pool_id, user_id))
        .first::<PoolMember>(&mut conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(ErrorCode::MemberNotFound, "user is not a member of this pool")
        })?;

    Ok(Json(ApiResponse::ok(member)))
}
