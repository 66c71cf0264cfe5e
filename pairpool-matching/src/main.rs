use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod clients;
mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use clients::pool_client::PoolClient;
use config::AppConfig;
use pairpool_shared::clients::db::{create_pool, DbPool};
use pairpool_shared::clients::rabbitmq::RabbitMQClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub pool_client: PoolClient,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pairpool_shared::middleware::init_tracing("pairpool-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let pool_client = PoolClient::new(&config.pool_service_url)?;
    let metrics_handle = pairpool_shared::middleware::init_metrics();

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        pool_client,
        metrics_handle,
    });

    // Pool events drive match cleanup when members leave or pools disappear.
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_pool_events(sub_state).await {
            tracing::error!(error = %e, "pool event subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/matches", post(routes::matches::create_match).get(routes::matches::list_matches))
        .route(
            "/matches/:id",
            get(routes::matches::get_match)
                .patch(routes::matches::override_status)
                .delete(routes::matches::delete_match),
        )
        .route(
            "/matches/:id/decisions/summary",
            get(routes::matches::decision_summary),
        )
        .route(
            "/decisions",
            post(routes::decisions::submit_decision).get(routes::decisions::list_decisions),
        )
        .route(
            "/internal/cleanup/pools/:pool_id/users/:user_id",
            delete(routes::internal::cleanup_user_matches),
        )
        .layer(axum::middleware::from_fn(
            pairpool_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "pairpool-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
