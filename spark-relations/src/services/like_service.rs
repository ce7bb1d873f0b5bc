use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;

use crate::models::{Like, NewLike};
use crate::relations::identity::distinct;
use crate::relations::{MatchId, MatchRegistry, RelationError, RelationResult, RelationStore, Resource, VisibilityPolicy};
use crate::schema::{likes, users};

#[derive(Debug, Serialize)]
pub struct LikeOutcome {
    pub like: Like,
    /// False when the like already existed.
    #[serde(skip)]
    pub created: bool,
    /// Set once both users liked each other.
    pub match_id: Option<MatchId>,
    /// True when this call wrote the match row.
    #[serde(skip)]
    pub match_created: bool,
}

/// Records `liker_id -> liked_id` and ensures the match when the like is mutual.
///
/// Safe to repeat: an existing like is returned as-is and the reverse check runs
/// again, so a match missed by an earlier failed attempt is still created.
/// `match_created` is set for exactly one request even when both users like
/// each other at the same moment.
pub fn record_like<S: RelationStore + ?Sized>(
    conn: &mut PgConnection,
    store: &S,
    liker_id: i64,
    liked_id: i64,
) -> RelationResult<LikeOutcome> {
    let (liker, liked) = distinct(liker_id, liked_id)?;

    let target_exists = users::table
        .find(liked.get())
        .select(users::id)
        .first::<i64>(conn)
        .optional()?
        .is_some();
    // A hidden target answers exactly like a missing one.
    if !target_exists || !VisibilityPolicy::new(store).can_view(liker.get(), liked.get())? {
        return Err(RelationError::NotFound(Resource::User));
    }

    let inserted = diesel::insert_into(likes::table)
        .values(&NewLike {
            liker_id: liker.get(),
            liked_id: liked.get(),
        })
        .on_conflict((likes::liker_id, likes::liked_id))
        .do_nothing()
        .get_result::<Like>(conn)
        .optional()?;

    let (like, created) = match inserted {
        Some(like) => (like, true),
        None => {
            // Withdrawn between the conflicting insert and this read.
            let existing = likes::table
                .filter(likes::liker_id.eq(liker.get()))
                .filter(likes::liked_id.eq(liked.get()))
                .first::<Like>(conn)
                .optional()?
                .ok_or(RelationError::NotFound(Resource::Record))?;
            (existing, false)
        }
    };

    let reciprocated = liked_by(conn, liked.get(), liker.get())?;
    let ensured = if reciprocated {
        Some(MatchRegistry::new(store).ensure_match(liker.get(), liked.get())?)
    } else {
        None
    };
    let match_id = ensured.map(|m| m.match_id);
    let match_created = ensured.is_some_and(|m| m.created);

    tracing::info!(
        like_id = like.id,
        liker_id = %liker,
        liked_id = %liked,
        created,
        matched = match_id.is_some(),
        match_created,
        "like recorded"
    );

    Ok(LikeOutcome {
        like,
        created,
        match_id,
        match_created,
    })
}

/// Whether `liker_id` has liked `liked_id`.
pub fn liked_by(conn: &mut PgConnection, liker_id: i64, liked_id: i64) -> RelationResult<bool> {
    let found = diesel::select(diesel::dsl::exists(
        likes::table
            .filter(likes::liker_id.eq(liker_id))
            .filter(likes::liked_id.eq(liked_id)),
    ))
    .get_result::<bool>(conn)?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn outcome_hides_the_creation_flag() {
        let outcome = LikeOutcome {
            like: Like {
                id: 11,
                liker_id: 3,
                liked_id: 7,
                created_at: Utc::now(),
            },
            created: true,
            match_id: Some(2),
            match_created: true,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("created").is_none());
        assert!(json.get("match_created").is_none());
        assert_eq!(json["match_id"], 2);
        assert_eq!(json["like"]["liked_id"], 7);
    }
}
