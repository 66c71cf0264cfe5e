use uuid::Uuid;

use pairpool_shared::clients::rabbitmq::RabbitMQClient;
use pairpool_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_member_added(rabbitmq: &RabbitMQClient, pool_id: Uuid, user_id: Uuid) {
    let event = Event::new(
        "pairpool-pool",
        routing_keys::POOL_MEMBER_ADDED,
        payloads::PoolMemberAdded { pool_id, user_id },
    );

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish member.added event");
    }
}

pub async fn publish_member_removed(rabbitmq: &RabbitMQClient, pool_id: Uuid, user_id: Uuid) {
    let event = Event::new(
        "pairpool-pool",
        routing_keys::POOL_MEMBER_REMOVED,
        payloads::PoolMemberRemoved { pool_id, user_id },
    );

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish member.removed event");
    }
}

pub async fn publish_pool_deleted(rabbitmq: &RabbitMQClient, pool_id: Uuid) {
    let event = Event::new(
        "pairpool-pool",
        routing_keys::POOL_DELETED,
        payloads::PoolDeleted { pool_id },
    );

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish pool.deleted event");
    }
}
