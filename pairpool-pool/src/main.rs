use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;

use config::AppConfig;
use pairpool_shared::clients::db::{create_pool, DbPool};
use pairpool_shared::clients::rabbitmq::RabbitMQClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pairpool_shared::middleware::init_tracing("pairpool-pool");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/pools", post(routes::pools::create_pool).get(routes::pools::list_pools))
        .route(
            "/pools/:id",
            get(routes::pools::get_pool)
                .patch(routes::pools::update_pool)
                .delete(routes::pools::delete_pool),
        )
        .route(
            "/pools/:id/members",
            post(routes::members::add_member).get(routes::members::list_members),
        )
        .route(
            "/pools/:id/members/:user_id",
            get(routes::members::get_member).delete(routes::members::remove_member),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "pairpool-pool starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
