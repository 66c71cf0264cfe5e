use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{match_decisions, matches};

// --- Domain enums ---
//
// Stored as text in the database; parsed at the service layer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Accepted,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionValue {
    Accept,
    Reject,
}

impl DecisionValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub pool_id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub status: String,
}

// --- MatchDecision ---

#[derive(Debug, Queryable, Serialize, Clone)]
#[diesel(table_name = match_decisions)]
pub struct MatchDecision {
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub decision: String,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = match_decisions)]
pub struct NewMatchDecision {
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub decision: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_round_trips() {
        for status in [MatchStatus::Waiting, MatchStatus::Accepted, MatchStatus::Rejected] {
            assert_eq!(MatchStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MatchStatus::parse("pending"), None);
    }

    #[test]
    fn decision_text_round_trips() {
        assert_eq!(DecisionValue::parse("accept"), Some(DecisionValue::Accept));
        assert_eq!(DecisionValue::parse("reject"), Some(DecisionValue::Reject));
        assert_eq!(DecisionValue::parse("maybe"), None);
    }

    #[test]
    fn decision_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DecisionValue::Accept).unwrap(),
            "\"accept\""
        );
        assert_eq!(
            serde_json::from_str::<DecisionValue>("\"reject\"").unwrap(),
            DecisionValue::Reject
        );
    }

    #[test]
    fn involves_checks_both_sides() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let m = Match {
            id: Uuid::new_v4(),
            pool_id: Uuid::new_v4(),
            user_a: a,
            user_b: b,
            status: "waiting".into(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(m.involves(a));
        assert!(m.involves(b));
        assert!(!m.involves(Uuid::new_v4()));
    }
}
