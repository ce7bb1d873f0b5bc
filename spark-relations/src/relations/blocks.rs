use super::error::RelationResult;
use super::identity::{distinct, UserId};
use super::store::RelationStore;

/// Directional block rows, read back as a symmetric "hidden" predicate.
pub struct BlockRegistry<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: RelationStore + ?Sized> BlockRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// True when `a` blocked `b` or `b` blocked `a`.
    pub fn is_blocked_either_direction(&self, a: i64, b: i64) -> RelationResult<bool> {
        let (a, b) = distinct(a, b)?;
        self.hidden(a, b)
    }

    pub(crate) fn hidden(&self, a: UserId, b: UserId) -> RelationResult<bool> {
        // Two directional checks; each row keeps who initiated the block.
        let outgoing = self.store.block_exists(a, b)?;
        let incoming = self.store.block_exists(b, a)?;
        Ok(outgoing || incoming)
    }

    /// Idempotent. Returns `true` when the block is new.
    pub fn block(&self, blocker_id: i64, blocked_id: i64) -> RelationResult<bool> {
        let (blocker, blocked) = distinct(blocker_id, blocked_id)?;
        let created = self.store.insert_block(blocker, blocked)?;
        if created {
            tracing::info!(blocker_id = %blocker, blocked_id = %blocked, "user blocked");
        }
        Ok(created)
    }

    /// Lifts a block the caller initiated. A block placed by the other party is untouched.
    pub fn unblock(&self, blocker_id: i64, blocked_id: i64) -> RelationResult<bool> {
        let (blocker, blocked) = distinct(blocker_id, blocked_id)?;
        let removed = self.store.delete_block(blocker, blocked)?;
        if removed {
            tracing::info!(blocker_id = %blocker, blocked_id = %blocked, "user unblocked");
        }
        Ok(removed)
    }

    pub fn blocked_by(&self, blocker_id: i64) -> RelationResult<Vec<UserId>> {
        self.store.blocked_by(UserId::new(blocker_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::error::RelationError;
    use crate::relations::memory::MemoryRelationStore;

    #[test]
    fn block_hides_in_both_directions() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);

        assert!(blocks.block(10, 4).unwrap());
        assert!(blocks.is_blocked_either_direction(10, 4).unwrap());
        assert!(blocks.is_blocked_either_direction(4, 10).unwrap());
        assert!(!blocks.is_blocked_either_direction(4, 11).unwrap());
    }

    #[test]
    fn predicate_is_symmetric_for_any_state() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);
        blocks.block(1, 2).unwrap();
        blocks.block(3, 1).unwrap();
        blocks.block(2, 3).unwrap();
        blocks.block(3, 2).unwrap();

        for a in 1..=4 {
            for b in 1..=4 {
                if a == b {
                    continue;
                }
                assert_eq!(
                    blocks.is_blocked_either_direction(a, b).unwrap(),
                    blocks.is_blocked_either_direction(b, a).unwrap(),
                    "asymmetric for ({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn both_directions_are_checked() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);
        blocks.block(1, 2).unwrap();

        let before = store.reads();
        blocks.is_blocked_either_direction(1, 2).unwrap();
        assert_eq!(store.reads() - before, 2);
    }

    #[test]
    fn block_is_idempotent() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);

        assert!(blocks.block(5, 6).unwrap());
        assert!(!blocks.block(5, 6).unwrap());
        assert_eq!(blocks.blocked_by(5).unwrap(), vec![UserId::new(6).unwrap()]);
    }

    #[test]
    fn self_block_is_rejected() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);

        assert!(matches!(blocks.block(5, 5), Err(RelationError::InvalidIdentifier(_))));
        assert!(matches!(
            blocks.is_blocked_either_direction(5, 5),
            Err(RelationError::InvalidIdentifier(_))
        ));
        assert!(matches!(blocks.block(0, 5), Err(RelationError::InvalidIdentifier(_))));
    }

    #[test]
    fn unblock_only_lifts_own_block() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);
        blocks.block(1, 2).unwrap();
        blocks.block(2, 1).unwrap();

        assert!(blocks.unblock(1, 2).unwrap());
        assert!(!blocks.unblock(1, 2).unwrap());
        // 2 still blocks 1
        assert!(blocks.is_blocked_either_direction(1, 2).unwrap());

        assert!(blocks.unblock(2, 1).unwrap());
        assert!(!blocks.is_blocked_either_direction(1, 2).unwrap());
    }

    #[test]
    fn blocked_by_lists_most_recent_first() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);
        blocks.block(1, 4).unwrap();
        blocks.block(9, 1).unwrap();
        blocks.block(1, 7).unwrap();

        let ids: Vec<i64> = blocks.blocked_by(1).unwrap().into_iter().map(UserId::get).collect();
        assert_eq!(ids, vec![7, 4]);
    }

    #[test]
    fn storage_failure_propagates() {
        let store = MemoryRelationStore::new();
        let blocks = BlockRegistry::new(&store);
        store.set_unavailable(true);

        let err = blocks.is_blocked_either_direction(1, 2).unwrap_err();
        assert!(err.is_retryable());
    }
}
