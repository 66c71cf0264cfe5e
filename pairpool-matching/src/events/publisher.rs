use uuid::Uuid;

use pairpool_shared::clients::rabbitmq::RabbitMQClient;
use pairpool_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{DecisionValue, Match};

pub async fn publish_match_created(rabbitmq: &RabbitMQClient, match_row: &Match) {
    let event = Event::new(
        "pairpool-matching",
        routing_keys::MATCH_CREATED,
        payloads::MatchCreated {
            match_id: match_row.id,
            pool_id: match_row.pool_id,
            user_a: match_row.user_a,
            user_b: match_row.user_b,
        },
    );

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_decision_recorded(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_id: Uuid,
    decision: DecisionValue,
) {
    let event = Event::new(
        "pairpool-matching",
        routing_keys::DECISION_RECORDED,
        payloads::DecisionRecorded {
            match_id,
            user_id,
            decision: decision.as_str().to_string(),
        },
    );

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish decision.recorded event");
    }
}

pub async fn publish_match_resolved(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    pool_id: Uuid,
    status: &str,
) {
    let event = Event::new(
        "pairpool-matching",
        routing_keys::MATCH_RESOLVED,
        payloads::MatchResolved {
            match_id,
            pool_id,
            status: status.to_string(),
        },
    );

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish match.resolved event");
    }
}
