use std::collections::HashSet;

use diesel::dsl::exists;
use diesel::prelude::*;

use spark_shared::clients::db::DbPool;

use super::error::{RelationError, RelationResult};
use super::identity::{canonicalize, CanonicalPair, UserId};
use super::store::{MatchId, RelationStore};
use crate::models::{NewBlocker, NewMatch};
use crate::schema::{blockers, matches};

/// [`RelationStore`] over the service's Postgres pool. Each call checks out one
/// connection.
#[derive(Clone)]
pub struct PgRelationStore {
    pool: DbPool,
}

impl PgRelationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RelationStore for PgRelationStore {
    fn block_exists(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool> {
        let mut conn = self.pool.get()?;
        let found = diesel::select(exists(
            blockers::table
                .filter(blockers::blocker_id.eq(blocker.get()))
                .filter(blockers::blocked_id.eq(blocked.get())),
        ))
        .get_result::<bool>(&mut conn)?;
        Ok(found)
    }

    fn insert_block(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool> {
        let mut conn = self.pool.get()?;
        let inserted = diesel::insert_into(blockers::table)
            .values(&NewBlocker {
                blocker_id: blocker.get(),
                blocked_id: blocked.get(),
            })
            .on_conflict((blockers::blocker_id, blockers::blocked_id))
            .do_nothing()
            .execute(&mut conn)?;
        Ok(inserted > 0)
    }

    fn delete_block(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            blockers::table
                .filter(blockers::blocker_id.eq(blocker.get()))
                .filter(blockers::blocked_id.eq(blocked.get())),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn blocked_by(&self, blocker: UserId) -> RelationResult<Vec<UserId>> {
        let mut conn = self.pool.get()?;
        let ids: Vec<i64> = blockers::table
            .filter(blockers::blocker_id.eq(blocker.get()))
            .order((blockers::created_at.desc(), blockers::id.desc()))
            .select(blockers::blocked_id)
            .load(&mut conn)?;
        ids.into_iter().map(stored_user).collect()
    }

    fn hidden_among(&self, viewer: UserId, candidates: &[UserId]) -> RelationResult<HashSet<UserId>> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<i64> = candidates.iter().map(|id| id.get()).collect();

        let mut conn = self.pool.get()?;
        let rows: Vec<(i64, i64)> = blockers::table
            .filter(
                blockers::blocker_id
                    .eq(viewer.get())
                    .and(blockers::blocked_id.eq_any(&ids)),
            )
            .or_filter(
                blockers::blocked_id
                    .eq(viewer.get())
                    .and(blockers::blocker_id.eq_any(&ids)),
            )
            .select((blockers::blocker_id, blockers::blocked_id))
            .load(&mut conn)?;

        rows.into_iter()
            .map(|(blocker, blocked)| if blocker == viewer.get() { blocked } else { blocker })
            .map(stored_user)
            .collect()
    }

    fn find_match(&self, pair: CanonicalPair) -> RelationResult<Option<MatchId>> {
        let mut conn = self.pool.get()?;
        let id = matches::table
            .filter(matches::user_a_id.eq(pair.low().get()))
            .filter(matches::user_b_id.eq(pair.high().get()))
            .select(matches::id)
            .first::<i64>(&mut conn)
            .optional()?;
        Ok(id)
    }

    fn insert_match(&self, pair: CanonicalPair) -> RelationResult<(MatchId, bool)> {
        let mut conn = self.pool.get()?;
        let inserted = diesel::insert_into(matches::table)
            .values(&NewMatch {
                user_a_id: pair.low().get(),
                user_b_id: pair.high().get(),
            })
            .on_conflict((matches::user_a_id, matches::user_b_id))
            .do_nothing()
            .returning(matches::id)
            .get_result::<i64>(&mut conn)
            .optional()?;

        if let Some(id) = inserted {
            return Ok((id, true));
        }

        // ON CONFLICT waited for the winning insert to commit, so the row is visible.
        let id = matches::table
            .filter(matches::user_a_id.eq(pair.low().get()))
            .filter(matches::user_b_id.eq(pair.high().get()))
            .select(matches::id)
            .first::<i64>(&mut conn)?;
        Ok((id, false))
    }

    fn match_pair(&self, match_id: MatchId) -> RelationResult<Option<CanonicalPair>> {
        let mut conn = self.pool.get()?;
        let row = matches::table
            .find(match_id)
            .select((matches::user_a_id, matches::user_b_id))
            .first::<(i64, i64)>(&mut conn)
            .optional()?;

        row.map(|(a, b)| {
            canonicalize(a, b).map_err(|e| {
                RelationError::Internal(format!("match {match_id} has a malformed pair: {e}"))
            })
        })
        .transpose()
    }
}

fn stored_user(raw: i64) -> RelationResult<UserId> {
    UserId::new(raw).map_err(|e| RelationError::Internal(format!("malformed stored row: {e}")))
}
