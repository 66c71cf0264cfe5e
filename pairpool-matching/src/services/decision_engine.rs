//! Decision recording and match status recomputation.
//!
//! A match moves between `waiting`, `accepted`, and `rejected` purely as a
//! function of the latest decision per participant: any reject makes the match
//! rejected, two accepts make it accepted, anything else leaves it waiting.
//! The upsert and the recompute run in one transaction holding a row lock on
//! the match, so concurrent submissions from both participants serialize and
//! the stored status always reflects the full decision set.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{DecisionValue, Match, MatchDecision, MatchStatus, NewMatchDecision};
use crate::schema::{match_decisions, matches};

/// Order-independent status rule. Reject dominates unconditionally.
pub fn status_from_decisions<I>(decisions: I) -> MatchStatus
where
    I: IntoIterator<Item = DecisionValue>,
{
    let mut accepts = 0;
    for decision in decisions {
        match decision {
            DecisionValue::Reject => return MatchStatus::Rejected,
            DecisionValue::Accept => accepts += 1,
        }
    }
    if accepts >= 2 {
        MatchStatus::Accepted
    } else {
        MatchStatus::Waiting
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DecisionSummary {
    pub accept_count: i64,
    pub reject_count: i64,
    pub pending_count: i64,
}

pub fn summarize<I>(decisions: I) -> DecisionSummary
where
    I: IntoIterator<Item = DecisionValue>,
{
    let mut accept_count = 0;
    let mut reject_count = 0;
    for decision in decisions {
        match decision {
            DecisionValue::Accept => accept_count += 1,
            DecisionValue::Reject => reject_count += 1,
        }
    }
    DecisionSummary {
        accept_count,
        reject_count,
        pending_count: (2 - accept_count - reject_count).max(0),
    }
}

#[derive(Debug)]
pub struct DecisionOutcome {
    pub match_row: Match,
    pub decision: MatchDecision,
    pub previous_status: MatchStatus,
}

/// Record a participant's decision and recompute the match status.
///
/// Runs as a single transaction: the match row is locked, the decision is
/// upserted on (match_id, user_id), and the status is recomputed from the
/// decision set as read after the upsert. Either both writes commit or
/// neither does. Resubmitting the same decision is a no-op beyond refreshing
/// its timestamp.
pub fn submit_decision(
    conn: &mut PgConnection,
    match_id: Uuid,
    user_id: Uuid,
    value: DecisionValue,
) -> AppResult<DecisionOutcome> {
    conn.transaction::<_, AppError, _>(|conn| {
        let match_row = matches::table
            .find(match_id)
            .for_update()
            .first::<Match>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

        if !match_row.involves(user_id) {
            return Err(AppError::new(
                ErrorCode::NotInMatch,
                "user is not a participant in this match",
            ));
        }

        let previous_status =
            MatchStatus::parse(&match_row.status).unwrap_or(MatchStatus::Waiting);

        let decision: MatchDecision = diesel::insert_into(match_decisions::table)
            .values(&NewMatchDecision {
                match_id,
                user_id,
                decision: value.as_str().to_string(),
            })
            .on_conflict((match_decisions::match_id, match_decisions::user_id))
            .do_update()
            .set((
                match_decisions::decision.eq(value.as_str()),
                match_decisions::decided_at.eq(diesel::dsl::now),
            ))
            .get_result(conn)?;

        // Re-read the decision set after our own upsert, inside the same
        // transaction, so the computed status can never lag a committed write.
        let recorded: Vec<String> = match_decisions::table
            .filter(match_decisions::match_id.eq(match_id))
            .select(match_decisions::decision)
            .load(conn)?;

        let status = status_from_decisions(
            recorded.iter().filter_map(|s| DecisionValue::parse(s)),
        );

        // updated_at is refreshed on every submission, even when the computed
        // status is unchanged.
        let match_row: Match = diesel::update(matches::table.find(match_id))
            .set((
                matches::status.eq(status.as_str()),
                matches::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(conn)?;

        Ok(DecisionOutcome {
            match_row,
            decision,
            previous_status,
        })
    })
}

/// Decision counts for a match: {accept, reject, pending} with
/// pending = 2 - accept - reject.
pub fn decision_summary(conn: &mut PgConnection, match_id: Uuid) -> AppResult<DecisionSummary> {
    let exists: bool = matches::table
        .find(match_id)
        .count()
        .get_result::<i64>(conn)
        .map(|c| c > 0)?;

    if !exists {
        return Err(AppError::new(ErrorCode::MatchNotFound, "match not found"));
    }

    let recorded: Vec<String> = match_decisions::table
        .filter(match_decisions::match_id.eq(match_id))
        .select(match_decisions::decision)
        .load(conn)?;

    Ok(summarize(
        recorded.iter().filter_map(|s| DecisionValue::parse(s)),
    ))
}

/// List decisions, newest first, optionally filtered by match and/or user.
pub fn list_decisions(
    conn: &mut PgConnection,
    match_id: Option<Uuid>,
    user_id: Option<Uuid>,
) -> AppResult<Vec<MatchDecision>> {
    let mut query = match_decisions::table.into_boxed();

    if let Some(match_id) = match_id {
        query = query.filter(match_decisions::match_id.eq(match_id));
    }
    if let Some(user_id) = user_id {
        query = query.filter(match_decisions::user_id.eq(user_id));
    }

    let decisions = query
        .order(match_decisions::decided_at.desc())
        .load::<MatchDecision>(conn)?;

    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::models::DecisionValue::{Accept, Reject};
    use crate::models::MatchStatus::{Accepted, Rejected, Waiting};

    /// In-memory mirror of the upsert-then-recompute protocol: one decision
    /// slot per participant, status always recomputed from the latest values.
    struct TwoPartyMatch {
        status: MatchStatus,
        decisions: BTreeMap<u8, DecisionValue>,
    }

    impl TwoPartyMatch {
        fn new() -> Self {
            Self {
                status: Waiting,
                decisions: BTreeMap::new(),
            }
        }

        fn submit(&mut self, participant: u8, value: DecisionValue) -> MatchStatus {
            self.decisions.insert(participant, value);
            self.status = status_from_decisions(self.decisions.values().copied());
            self.status
        }
    }

    #[test]
    fn no_decisions_is_waiting() {
        assert_eq!(status_from_decisions([]), Waiting);
    }

    #[test]
    fn single_accept_is_waiting() {
        assert_eq!(status_from_decisions([Accept]), Waiting);
    }

    #[test]
    fn two_accepts_is_accepted() {
        assert_eq!(status_from_decisions([Accept, Accept]), Accepted);
    }

    #[test]
    fn reject_dominates_in_any_order() {
        assert_eq!(status_from_decisions([Reject]), Rejected);
        assert_eq!(status_from_decisions([Reject, Accept]), Rejected);
        assert_eq!(status_from_decisions([Accept, Reject]), Rejected);
        assert_eq!(status_from_decisions([Reject, Reject]), Rejected);
    }

    #[test]
    fn rule_is_order_independent() {
        let sets: [&[DecisionValue]; 3] = [&[Accept, Reject], &[Accept, Accept], &[Reject, Reject]];
        for set in sets {
            let forward = status_from_decisions(set.iter().copied());
            let backward = status_from_decisions(set.iter().rev().copied());
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn scenario_both_accept() {
        let mut m = TwoPartyMatch::new();
        assert_eq!(m.submit(1, Accept), Waiting);
        assert_eq!(m.submit(2, Accept), Accepted);

        let summary = summarize(m.decisions.values().copied());
        assert_eq!(
            summary,
            DecisionSummary {
                accept_count: 2,
                reject_count: 0,
                pending_count: 0
            }
        );
    }

    #[test]
    fn scenario_accept_then_reject() {
        let mut m = TwoPartyMatch::new();
        assert_eq!(m.submit(1, Accept), Waiting);
        assert_eq!(m.submit(2, Reject), Rejected);
    }

    #[test]
    fn scenario_change_of_mind_overwrites() {
        let mut m = TwoPartyMatch::new();
        assert_eq!(m.submit(1, Reject), Rejected);
        assert_eq!(m.submit(1, Accept), Waiting);
        assert_eq!(m.submit(2, Accept), Accepted);
        assert_eq!(m.decisions.len(), 2);
    }

    #[test]
    fn resubmission_is_idempotent() {
        let mut m = TwoPartyMatch::new();
        let first = m.submit(1, Accept);
        let second = m.submit(1, Accept);
        assert_eq!(first, second);
        assert_eq!(m.decisions.len(), 1);
    }

    #[test]
    fn submission_order_does_not_matter() {
        let mut ab = TwoPartyMatch::new();
        ab.submit(1, Accept);
        ab.submit(2, Accept);

        let mut ba = TwoPartyMatch::new();
        ba.submit(2, Accept);
        ba.submit(1, Accept);

        assert_eq!(ab.status, ba.status);
    }

    #[test]
    fn summary_counts_pending() {
        assert_eq!(
            summarize([]),
            DecisionSummary {
                accept_count: 0,
                reject_count: 0,
                pending_count: 2
            }
        );
        assert_eq!(
            summarize([Accept]),
            DecisionSummary {
                accept_count: 1,
                reject_count: 0,
                pending_count: 1
            }
        );
        assert_eq!(
            summarize([Accept, Reject]),
            DecisionSummary {
                accept_count: 1,
                reject_count: 1,
                pending_count: 0
            }
        );
    }
}
