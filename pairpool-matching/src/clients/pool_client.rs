use axum::http::StatusCode;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult};

/// HTTP client for the pool service's membership lookup.
#[derive(Clone)]
pub struct PoolClient {
    http: reqwest::Client,
    base_url: String,
}

impl PoolClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Whether `user_id` is currently a member of `pool_id`.
    pub async fn is_member(&self, pool_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let url = format!("{}/pools/{pool_id}/members/{user_id}", self.base_url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "pool service unreachable");
            AppError::unavailable("pool service unreachable")
        })?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                tracing::error!(status = %status, url = %url, "unexpected pool service response");
                Err(AppError::unavailable("pool service returned an error"))
            }
        }
    }
}
