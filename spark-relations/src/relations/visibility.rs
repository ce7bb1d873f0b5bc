use std::collections::HashSet;

use super::blocks::BlockRegistry;
use super::error::{RelationError, RelationResult, Resource};
use super::identity::UserId;
use super::matches::{MatchLookup, MatchRegistry};
use super::store::{MatchId, RelationStore};

/// Access predicate for every read that returns another user's data.
///
/// Listing queries in the routes apply the same rule inside SQL so that totals
/// and pages never account for hidden users; this type answers the point checks
/// and filters id lists handed over by other services.
pub struct VisibilityPolicy<'a, S: ?Sized> {
    store: &'a S,
    blocks: BlockRegistry<'a, S>,
    matches: MatchRegistry<'a, S>,
}

impl<'a, S: RelationStore + ?Sized> VisibilityPolicy<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            blocks: BlockRegistry::new(store),
            matches: MatchRegistry::new(store),
        }
    }

    /// False when a block exists between the two users in either direction.
    pub fn can_view(&self, viewer_id: i64, target_id: i64) -> RelationResult<bool> {
        let viewer = UserId::new(viewer_id)?;
        let target = UserId::new(target_id)?;
        if viewer == target {
            return Ok(true);
        }
        Ok(!self.blocks.hidden(viewer, target)?)
    }

    /// Stable filter: keeps the visible candidates, duplicates included, in input order.
    pub fn filter_listing(&self, viewer_id: i64, candidate_ids: &[i64]) -> RelationResult<Vec<UserId>> {
        let viewer = UserId::new(viewer_id)?;
        let candidates = candidate_ids
            .iter()
            .map(|&id| UserId::new(id))
            .collect::<RelationResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let others: Vec<UserId> = candidates
            .iter()
            .copied()
            .filter(|&id| id != viewer && seen.insert(id))
            .collect();

        if others.is_empty() {
            return Ok(candidates);
        }

        let hidden = self.store.hidden_among(viewer, &others)?;
        tracing::debug!(
            viewer_id,
            candidates = candidates.len(),
            hidden = hidden.len(),
            "listing filtered"
        );

        Ok(candidates.into_iter().filter(|id| !hidden.contains(id)).collect())
    }

    /// Match state between the viewer and `other_id`. A user hidden by a block
    /// reads as missing, so neither the match nor its id leaks.
    pub fn visible_match(&self, viewer_id: i64, other_id: i64) -> RelationResult<MatchLookup> {
        if !self.can_view(viewer_id, other_id)? {
            return Err(RelationError::NotFound(Resource::User));
        }
        self.matches.is_matched(viewer_id, other_id)
    }

    /// Counterpart of a match, provided the viewer participates and may still see them.
    /// A counterpart hidden by a block reads as a missing user.
    pub fn visible_counterpart(&self, match_id: MatchId, viewer_id: i64) -> RelationResult<UserId> {
        let counterpart = self.matches.get_counterpart(match_id, viewer_id)?;
        if self.can_view(viewer_id, counterpart.get())? {
            Ok(counterpart)
        } else {
            Err(RelationError::NotFound(Resource::User))
        }
    }
}
