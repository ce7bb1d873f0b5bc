use std::collections::HashSet;

use super::error::RelationResult;
use super::identity::{CanonicalPair, UserId};

pub type MatchId = i64;

/// Storage collaborator behind the registries.
///
/// Every method is a single statement against the store, except that
/// `insert_match` reads back the existing row when it lost the insert. Writes are idempotent;
/// the uniqueness of `(blocker, blocked)` and of the canonical match pair is the
/// store's job.
pub trait RelationStore: Send + Sync {
    fn block_exists(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool>;

    /// Returns `true` when a new row was written.
    fn insert_block(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool>;

    /// Removes only the `blocker -> blocked` row. Returns `true` if it existed.
    fn delete_block(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool>;

    /// Users blocked by `blocker`, most recent first.
    fn blocked_by(&self, blocker: UserId) -> RelationResult<Vec<UserId>>;

    /// The members of `candidates` sharing a block row with `viewer`, in either direction.
    fn hidden_among(&self, viewer: UserId, candidates: &[UserId]) -> RelationResult<HashSet<UserId>>;

    fn find_match(&self, pair: CanonicalPair) -> RelationResult<Option<MatchId>>;

    /// Insert-if-absent; returns the id of the one row stored for `pair` and
    /// whether this call wrote it.
    fn insert_match(&self, pair: CanonicalPair) -> RelationResult<(MatchId, bool)>;

    fn match_pair(&self, match_id: MatchId) -> RelationResult<Option<CanonicalPair>>;
}
