//! In-process [`RelationStore`] for tests and local tooling.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::error::{RelationError, RelationResult};
use super::identity::{CanonicalPair, UserId};
use super::store::{MatchId, RelationStore};

#[derive(Default)]
struct Inner {
    // insertion order doubles as creation time
    blocks: Vec<(UserId, UserId)>,
    matches: Vec<(MatchId, CanonicalPair)>,
    unavailable: bool,
    reads: usize,
}

#[derive(Default)]
pub struct MemoryRelationStore {
    inner: Mutex<Inner>,
}

impl MemoryRelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `StorageUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.unavailable = unavailable;
        }
    }

    /// Number of stored rows for `pair`.
    pub fn match_rows(&self, pair: CanonicalPair) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.matches.iter().filter(|(_, p)| *p == pair).count())
            .unwrap_or(0)
    }

    /// Number of read statements served so far.
    pub fn reads(&self) -> usize {
        self.inner.lock().map(|inner| inner.reads).unwrap_or(0)
    }

    fn lock(&self) -> RelationResult<MutexGuard<'_, Inner>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| RelationError::Internal("memory store poisoned".into()))?;
        if inner.unavailable {
            return Err(RelationError::StorageUnavailable("memory store offline".into()));
        }
        Ok(inner)
    }

    fn read(&self) -> RelationResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock()?;
        inner.reads += 1;
        Ok(inner)
    }
}

impl RelationStore for MemoryRelationStore {
    fn block_exists(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool> {
        Ok(self.read()?.blocks.contains(&(blocker, blocked)))
    }

    fn insert_block(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool> {
        let mut inner = self.lock()?;
        if inner.blocks.contains(&(blocker, blocked)) {
            return Ok(false);
        }
        inner.blocks.push((blocker, blocked));
        Ok(true)
    }

    fn delete_block(&self, blocker: UserId, blocked: UserId) -> RelationResult<bool> {
        let mut inner = self.lock()?;
        let before = inner.blocks.len();
        inner.blocks.retain(|row| *row != (blocker, blocked));
        Ok(inner.blocks.len() != before)
    }

    fn blocked_by(&self, blocker: UserId) -> RelationResult<Vec<UserId>> {
        let inner = self.read()?;
        Ok(inner
            .blocks
            .iter()
            .rev()
            .filter(|(from, _)| *from == blocker)
            .map(|(_, to)| *to)
            .collect())
    }

    fn hidden_among(&self, viewer: UserId, candidates: &[UserId]) -> RelationResult<HashSet<UserId>> {
        let inner = self.read()?;
        let wanted: HashSet<UserId> = candidates.iter().copied().collect();
        Ok(inner
            .blocks
            .iter()
            .filter_map(|&(from, to)| {
                if from == viewer && wanted.contains(&to) {
                    Some(to)
                } else if to == viewer && wanted.contains(&from) {
                    Some(from)
                } else {
                    None
                }
            })
            .collect())
    }

    fn find_match(&self, pair: CanonicalPair) -> RelationResult<Option<MatchId>> {
        let inner = self.read()?;
        Ok(inner.matches.iter().find(|(_, p)| *p == pair).map(|(id, _)| *id))
    }

    fn insert_match(&self, pair: CanonicalPair) -> RelationResult<(MatchId, bool)> {
        let mut inner = self.lock()?;
        if let Some((id, _)) = inner.matches.iter().find(|(_, p)| *p == pair) {
            return Ok((*id, false));
        }
        let id = inner.matches.len() as MatchId + 1;
        inner.matches.push((id, pair));
        Ok((id, true))
    }

    fn match_pair(&self, match_id: MatchId) -> RelationResult<Option<CanonicalPair>> {
        let inner = self.read()?;
        Ok(inner.matches.iter().find(|(id, _)| *id == match_id).map(|(_, p)| *p))
    }
}
