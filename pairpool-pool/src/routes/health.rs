use axum::Json;
use pairpool_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("pairpool-pool", env!("CARGO_PKG_VERSION")))
}
