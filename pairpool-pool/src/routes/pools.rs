use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use pairpool_shared::errors::{AppError, AppResult, ErrorCode};
use pairpool_shared::types::api::ApiResponse;
use pairpool_shared::types::pagination::{Page, PageParams};

use crate::events::publisher;
use crate::models::{NewPool, Pool};
use crate::schema::{pool_members, pools};
use crate::AppState;

// --- Request DTOs ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePoolRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePoolRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPoolsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    pub location: Option<String>,
}

fn default_page() -> i64 { 1 }
fn default_per_page() -> i64 { 20 }

impl ListPoolsQuery {
    fn pagination(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

// --- Handlers ---

/// POST /pools
pub async fn create_pool(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePoolRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Pool>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let new_pool = NewPool {
        name: req.name,
        location: req.location,
    };

    let pool: Pool = diesel::insert_into(pools::table)
        .values(&new_pool)
        .get_result(&mut conn)?;

    tracing::info!(pool_id = %pool.id, "pool created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(pool))))
}

/// GET /pools/:id
pub async fn get_pool(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Pool>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let pool = pools::table
        .find(pool_id)
        .first::<Pool>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PoolNotFound, "pool not found"))?;

    Ok(Json(ApiResponse::ok(pool)))
}

/// GET /pools?location=&page=&per_page=
pub async fn list_pools(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPoolsQuery>,
) -> AppResult<Json<ApiResponse<Page<Pool>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut count_query = pools::table.into_boxed();
    let mut list_query = pools::table.into_boxed();

    if let Some(location) = &query.location {
        count_query = count_query.filter(pools::location.eq(location));
        list_query = list_query.filter(pools::location.eq(location));
    }

    let total: i64 = count_query.count().get_result(&mut conn)?;

    let page = query.pagination();
    let items = list_query
        .order(pools::created_at.desc())
        .offset(page.offset())
        .limit(page.limit())
        .load::<Pool>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Page::new(items, total, &page))))
}

/// PATCH /pools/:id
pub async fn update_pool(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<Uuid>,
    Json(req): Json<UpdatePoolRequest>,
) -> AppResult<Json<ApiResponse<Pool>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut pool = pools::table
        .find(pool_id)
        .first::<Pool>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PoolNotFound, "pool not found"))?;

    if let Some(name) = req.name {
        pool = diesel::update(pools::table.find(pool_id))
            .set(pools::name.eq(name))
            .get_result(&mut conn)?;
    }
    if let Some(location) = req.location {
        pool = diesel::update(pools::table.find(pool_id))
            .set(pools::location.eq(location))
            .get_result(&mut conn)?;
    }

    Ok(Json(ApiResponse::ok(pool)))
}

/// DELETE /pools/:id
///
/// Members cascade in this database; matches live in the matching service and
/// are dropped by its pool.deleted subscriber.
pub async fn delete_pool(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: bool = pools::table
        .find(pool_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)?;

    if !exists {
        return Err(AppError::new(ErrorCode::PoolNotFound, "pool not found"));
    }

    conn.transaction::<_, AppError, _>(|conn| {
        diesel::delete(pool_members::table.filter(pool_members::pool_id.eq(pool_id)))
            .execute(conn)?;
        diesel::delete(pools::table.find(pool_id)).execute(conn)?;
        Ok(())
    })?;

    tracing::info!(pool_id = %pool_id, "pool deleted");

    publisher::publish_pool_deleted(&state.rabbitmq, pool_id).await;

    Ok(Json(ApiResponse::ok(serde_json::json!({ "deleted": pool_id }))))
}
