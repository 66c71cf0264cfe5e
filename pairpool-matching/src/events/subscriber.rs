use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use pairpool_shared::types::event::{payloads, routing_keys, Event};

use crate::services::match_service;
use crate::AppState;

/// Listen for pool events (member.removed, pool.deleted) and clean up the
/// affected matches. Deliveries are at-least-once; both cleanups are
/// idempotent, so a redelivery after a crash simply deletes nothing.
pub async fn listen_pool_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "pairpool-matching.pool",
            &[routing_keys::POOL_MEMBER_REMOVED, routing_keys::POOL_DELETED],
        )
        .await?;

    tracing::info!("listening for pool events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::POOL_MEMBER_REMOVED {
                    match serde_json::from_slice::<Event<payloads::PoolMemberRemoved>>(
                        &delivery.data,
                    ) {
                        Ok(event) => handle_member_removed(&state, &event.data),
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize member.removed event");
                        }
                    }
                } else if routing_key == routing_keys::POOL_DELETED {
                    match serde_json::from_slice::<Event<payloads::PoolDeleted>>(&delivery.data) {
                        Ok(event) => handle_pool_deleted(&state, &event.data),
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize pool.deleted event");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "pool event consumer error");
            }
        }
    }

    Ok(())
}

fn handle_member_removed(state: &AppState, data: &payloads::PoolMemberRemoved) {
    tracing::info!(
        pool_id = %data.pool_id,
        user_id = %data.user_id,
        "received member.removed event"
    );

    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "database connection error during cleanup");
            return;
        }
    };

    match match_service::cleanup_user_matches(&mut conn, data.pool_id, data.user_id) {
        Ok(stats) => {
            tracing::info!(
                pool_id = %data.pool_id,
                user_id = %data.user_id,
                matches_deleted = stats.matches_deleted,
                decisions_deleted = stats.decisions_deleted,
                "cleaned up matches for departed member"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to clean up matches for departed member");
        }
    }
}

fn handle_pool_deleted(state: &AppState, data: &payloads::PoolDeleted) {
    tracing::info!(pool_id = %data.pool_id, "received pool.deleted event");

    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "database connection error during cleanup");
            return;
        }
    };

    match match_service::cleanup_pool_matches(&mut conn, data.pool_id) {
        Ok(stats) => {
            tracing::info!(
                pool_id = %data.pool_id,
                matches_deleted = stats.matches_deleted,
                decisions_deleted = stats.decisions_deleted,
                "cleaned up matches for deleted pool"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to clean up matches for deleted pool");
        }
    }
}
