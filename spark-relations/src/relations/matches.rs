use serde::Serialize;

use super::error::{RelationError, RelationResult, Resource};
use super::identity::{canonicalize, CanonicalPair, UserId};
use super::store::{MatchId, RelationStore};

/// Result of a match lookup; carries the id so callers skip a second query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchLookup {
    pub matched: bool,
    pub match_id: Option<MatchId>,
}

impl From<Option<MatchId>> for MatchLookup {
    fn from(match_id: Option<MatchId>) -> Self {
        Self {
            matched: match_id.is_some(),
            match_id,
        }
    }
}

/// Outcome of [`MatchRegistry::ensure_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsuredMatch {
    pub pair: CanonicalPair,
    pub match_id: MatchId,
    /// True only for the call that wrote the row.
    pub created: bool,
}

/// The symmetric match relation, keyed by canonical pair.
pub struct MatchRegistry<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: RelationStore + ?Sized> MatchRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn is_matched(&self, user_id: i64, other_id: i64) -> RelationResult<MatchLookup> {
        let pair = canonicalize(user_id, other_id)?;
        Ok(self.store.find_match(pair)?.into())
    }

    /// Idempotent: the same canonical pair always yields the same match id.
    pub fn create_match(&self, user_id: i64, other_id: i64) -> RelationResult<MatchId> {
        Ok(self.ensure_match(user_id, other_id)?.match_id)
    }

    /// Like [`create_match`](Self::create_match), also reporting whether this call
    /// wrote the row. Of any number of concurrent callers exactly one sees `created`.
    pub fn ensure_match(&self, user_id: i64, other_id: i64) -> RelationResult<EnsuredMatch> {
        let pair = canonicalize(user_id, other_id)?;
        let (match_id, created) = self.store.insert_match(pair)?;
        tracing::info!(
            match_id,
            user_a_id = %pair.low(),
            user_b_id = %pair.high(),
            created,
            "match ensured"
        );
        Ok(EnsuredMatch { pair, match_id, created })
    }

    pub fn participants(&self, match_id: MatchId) -> RelationResult<CanonicalPair> {
        if match_id <= 0 {
            return Err(RelationError::InvalidIdentifier(format!(
                "{match_id} is not a positive match id"
            )));
        }
        self.store
            .match_pair(match_id)?
            .ok_or(RelationError::NotFound(Resource::Match))
    }

    /// The other participant of `match_id`. Fails with `NotAuthorized` unless
    /// `viewer_id` is one of the two.
    pub fn get_counterpart(&self, match_id: MatchId, viewer_id: i64) -> RelationResult<UserId> {
        let viewer = UserId::new(viewer_id)?;
        let pair = self.participants(match_id)?;
        pair.other(viewer).map_err(|err| {
            tracing::warn!(match_id, viewer_id, "counterpart requested by non-participant");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::memory::MemoryRelationStore;

    #[test]
    fn mutual_like_scenario_yields_one_match() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);

        let first = matches.create_match(3, 7).unwrap();
        let second = matches.create_match(7, 3).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.match_rows(canonicalize(3, 7).unwrap()), 1);

        let forward = matches.is_matched(3, 7).unwrap();
        let backward = matches.is_matched(7, 3).unwrap();
        assert!(forward.matched);
        assert_eq!(forward, backward);
        assert_eq!(forward.match_id, Some(first));
    }

    #[test]
    fn create_match_twice_is_idempotent() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);

        let id = matches.create_match(1, 2).unwrap();
        assert_eq!(matches.create_match(1, 2).unwrap(), id);
        assert_eq!(store.match_rows(canonicalize(1, 2).unwrap()), 1);

        let other = matches.create_match(1, 3).unwrap();
        assert_ne!(other, id);
    }

    #[test]
    fn only_the_first_ensure_reports_creation() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);

        let first = matches.ensure_match(7, 3).unwrap();
        let again = matches.ensure_match(3, 7).unwrap();
        assert!(first.created);
        assert!(!again.created);
        assert_eq!(first.match_id, again.match_id);
        assert_eq!(first.pair, canonicalize(3, 7).unwrap());
        assert_eq!(first.pair.low().get(), 3);
    }

    #[test]
    fn unmatched_pair_reports_no_id() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);

        let lookup = matches.is_matched(4, 5).unwrap();
        assert_eq!(lookup, MatchLookup { matched: false, match_id: None });
    }

    #[test]
    fn self_match_is_rejected() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);

        assert!(matches!(matches.create_match(4, 4), Err(RelationError::InvalidIdentifier(_))));
        assert!(matches!(matches.is_matched(-4, 4), Err(RelationError::InvalidIdentifier(_))));
    }

    #[test]
    fn counterpart_for_participants() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);
        let id = matches.create_match(8, 2).unwrap();

        assert_eq!(matches.get_counterpart(id, 2).unwrap().get(), 8);
        assert_eq!(matches.get_counterpart(id, 8).unwrap().get(), 2);
    }

    #[test]
    fn outsider_cannot_resolve_counterpart() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);
        let id = matches.create_match(2, 8).unwrap();

        assert!(matches!(
            matches.get_counterpart(id, 1),
            Err(RelationError::NotAuthorized(_))
        ));
    }

    #[test]
    fn unknown_match_is_not_found() {
        let store = MemoryRelationStore::new();
        let matches = MatchRegistry::new(&store);

        assert!(matches!(
            matches.get_counterpart(99, 1),
            Err(RelationError::NotFound(Resource::Match))
        ));
        assert!(matches!(
            matches.get_counterpart(0, 1),
            Err(RelationError::InvalidIdentifier(_))
        ));
    }
}
