use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// The `event_type` doubles as the routing key on the topic exchange.
/// Format: `pairpool.{service}.{entity}.{action}`
/// Example: `pairpool.pool.member.removed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            data,
        }
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// Routing keys for the `pairpool.events` topic exchange.
pub mod routing_keys {
    // Pool events
    pub const POOL_MEMBER_ADDED: &str = "pairpool.pool.member.added";
    pub const POOL_MEMBER_REMOVED: &str = "pairpool.pool.member.removed";
    pub const POOL_DELETED: &str = "pairpool.pool.pool.deleted";

    // Matching events
    pub const MATCH_CREATED: &str = "pairpool.matching.match.created";
    pub const MATCH_RESOLVED: &str = "pairpool.matching.match.resolved";
    pub const DECISION_RECORDED: &str = "pairpool.matching.decision.recorded";
}

/// Event data payloads.
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PoolMemberAdded {
        pub pool_id: Uuid,
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PoolMemberRemoved {
        pub pool_id: Uuid,
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PoolDeleted {
        pub pool_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub pool_id: Uuid,
        pub user_a: Uuid,
        pub user_b: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchResolved {
        pub match_id: Uuid,
        pub pool_id: Uuid,
        pub status: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DecisionRecorded {
        pub match_id: Uuid,
        pub user_id: Uuid,
        pub decision: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips() {
        let event = Event::new(
            "pairpool-pool",
            routing_keys::POOL_MEMBER_REMOVED,
            payloads::PoolMemberRemoved {
                pool_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            },
        );

        let bytes = serde_json::to_vec(&event).unwrap();
        let parsed: Event<payloads::PoolMemberRemoved> = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.event_type, "pairpool.pool.member.removed");
        assert_eq!(parsed.data.pool_id, event.data.pool_id);
    }

    #[test]
    fn correlation_id_omitted_when_absent() {
        let event = Event::new(
            "pairpool-matching",
            routing_keys::MATCH_CREATED,
            serde_json::json!({}),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("correlation_id").is_none());
    }
}
