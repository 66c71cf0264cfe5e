//! Match lifecycle: creation with canonical pair ordering, lookup, listing,
//! administrative status override, deletion, and pool-departure cleanup.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::Serialize;
use uuid::Uuid;

use pairpool_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Match, MatchStatus, NewMatch};
use crate::schema::{match_decisions, matches};

/// Reject equal participants and put the pair in canonical order (smaller
/// identifier first), so (pool, a, b) names an unordered pair exactly once.
pub fn validate_pair(user_1: Uuid, user_2: Uuid) -> AppResult<(Uuid, Uuid)> {
    if user_1 == user_2 {
        return Err(AppError::new(
            ErrorCode::SameParticipant,
            "cannot match a user with themselves",
        ));
    }
    if user_1 < user_2 {
        Ok((user_1, user_2))
    } else {
        Ok((user_2, user_1))
    }
}

fn find_pair(
    conn: &mut PgConnection,
    pool_id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
) -> AppResult<Option<Match>> {
    let existing = matches::table
        .filter(matches::pool_id.eq(pool_id))
        .filter(matches::user_a.eq(user_a))
        .filter(matches::user_b.eq(user_b))
        .first::<Match>(conn)
        .optional()?;
    Ok(existing)
}

fn resolve_existing(existing: Match) -> AppResult<(Match, bool)> {
    if existing.status == MatchStatus::Waiting.as_str() {
        // Idempotent create: hand back the open match.
        Ok((existing, false))
    } else {
        Err(AppError::new(
            ErrorCode::DuplicateMatch,
            "a resolved match already exists for this pair",
        ))
    }
}

/// Create a match in `waiting` status for a canonical pair.
///
/// Returns `(match, created)`. An existing `waiting` match for the pair is
/// returned as-is; an existing resolved match is a `DuplicateMatch` conflict.
/// Participants are assumed to be canonicalized and membership-checked by the
/// caller.
pub fn create_match(
    conn: &mut PgConnection,
    pool_id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
) -> AppResult<(Match, bool)> {
    if let Some(existing) = find_pair(conn, pool_id, user_a, user_b)? {
        return resolve_existing(existing);
    }

    let inserted = diesel::insert_into(matches::table)
        .values(&NewMatch {
            pool_id,
            user_a,
            user_b,
            status: MatchStatus::Waiting.as_str().to_string(),
        })
        .get_result::<Match>(conn);

    match inserted {
        Ok(match_row) => Ok((match_row, true)),
        // Lost a race with a concurrent create for the same pair; the unique
        // constraint on (pool_id, user_a, user_b) guarantees a row now exists.
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            let existing = find_pair(conn, pool_id, user_a, user_b)?.ok_or_else(|| {
                AppError::internal("unique violation without a conflicting match row")
            })?;
            resolve_existing(existing)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_match(conn: &mut PgConnection, match_id: Uuid) -> AppResult<Match> {
    matches::table
        .find(match_id)
        .first::<Match>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))
}

/// List matches newest-first, with optional pool / participant / status filters.
pub fn list_matches(
    conn: &mut PgConnection,
    pool_id: Option<Uuid>,
    user_id: Option<Uuid>,
    status: Option<MatchStatus>,
) -> AppResult<Vec<Match>> {
    let mut query = matches::table.into_boxed();

    if let Some(pool_id) = pool_id {
        query = query.filter(matches::pool_id.eq(pool_id));
    }
    if let Some(user_id) = user_id {
        query = query.filter(matches::user_a.eq(user_id).or(matches::user_b.eq(user_id)));
    }
    if let Some(status) = status {
        query = query.filter(matches::status.eq(status.as_str()));
    }

    let rows = query
        .order(matches::created_at.desc())
        .load::<Match>(conn)?;

    Ok(rows)
}

/// Administrative status override. Bypasses the decision engine; the decision
/// rows are left untouched.
pub fn set_status(
    conn: &mut PgConnection,
    match_id: Uuid,
    status: MatchStatus,
) -> AppResult<Match> {
    let updated = diesel::update(matches::table.find(match_id))
        .set((
            matches::status.eq(status.as_str()),
            matches::updated_at.eq(diesel::dsl::now),
        ))
        .get_result::<Match>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    Ok(updated)
}

/// Delete a match and its decisions.
pub fn delete_match(conn: &mut PgConnection, match_id: Uuid) -> AppResult<()> {
    conn.transaction::<_, AppError, _>(|conn| {
        diesel::delete(match_decisions::table.filter(match_decisions::match_id.eq(match_id)))
            .execute(conn)?;
        let deleted = diesel::delete(matches::table.find(match_id)).execute(conn)?;
        if deleted == 0 {
            return Err(AppError::new(ErrorCode::MatchNotFound, "match not found"));
        }
        Ok(())
    })
}

#[derive(Debug, Serialize)]
pub struct CleanupStats {
    pub pool_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub matches_deleted: usize,
    pub decisions_deleted: usize,
}

/// Delete a departing participant's non-accepted matches in a pool, decisions
/// included. Accepted matches are kept.
pub fn cleanup_user_matches(
    conn: &mut PgConnection,
    pool_id: Uuid,
    user_id: Uuid,
) -> AppResult<CleanupStats> {
    conn.transaction::<_, AppError, _>(|conn| {
        let doomed: Vec<Uuid> = matches::table
            .filter(matches::pool_id.eq(pool_id))
            .filter(matches::user_a.eq(user_id).or(matches::user_b.eq(user_id)))
            .filter(matches::status.ne(MatchStatus::Accepted.as_str()))
            .select(matches::id)
            .load(conn)?;

        let decisions_deleted = diesel::delete(
            match_decisions::table.filter(match_decisions::match_id.eq_any(&doomed)),
        )
        .execute(conn)?;

        let matches_deleted =
            diesel::delete(matches::table.filter(matches::id.eq_any(&doomed))).execute(conn)?;

        Ok(CleanupStats {
            pool_id,
            user_id: Some(user_id),
            matches_deleted,
            decisions_deleted,
        })
    })
}

/// Delete every match in a pool (any status). Used when the pool itself is
/// deleted.
pub fn cleanup_pool_matches(conn: &mut PgConnection, pool_id: Uuid) -> AppResult<CleanupStats> {
    conn.transaction::<_, AppError, _>(|conn| {
        let doomed: Vec<Uuid> = matches::table
            .filter(matches::pool_id.eq(pool_id))
            .select(matches::id)
            .load(conn)?;

        let decisions_deleted = diesel::delete(
            match_decisions::table.filter(match_decisions::match_id.eq_any(&doomed)),
        )
        .execute(conn)?;

        let matches_deleted =
            diesel::delete(matches::table.filter(matches::id.eq_any(&doomed))).execute(conn)?;

        Ok(CleanupStats {
            pool_id,
            user_id: None,
            matches_deleted,
            decisions_deleted,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_participants_are_rejected() {
        let u = Uuid::new_v4();
        let err = validate_pair(u, u).unwrap_err();
        match err {
            AppError::Known { code, .. } => assert_eq!(code, ErrorCode::SameParticipant),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pair_is_canonicalized_both_ways() {
        let small = Uuid::from_u128(1);
        let large = Uuid::from_u128(u128::MAX);

        assert_eq!(validate_pair(small, large).unwrap(), (small, large));
        assert_eq!(validate_pair(large, small).unwrap(), (small, large));
    }

    #[test]
    fn cleanup_stats_omit_user_for_pool_wide_cleanup() {
        let stats = CleanupStats {
            pool_id: Uuid::new_v4(),
            user_id: None,
            matches_deleted: 3,
            decisions_deleted: 4,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("user_id").is_none());
        assert_eq!(json["matches_deleted"], 3);
    }
}
