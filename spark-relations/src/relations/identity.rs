//! User identifiers and the canonical ordering used as the key of symmetric relations.

use serde::Serialize;

use super::error::{RelationError, RelationResult};

/// A validated user identifier (strictly positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(raw: i64) -> RelationResult<Self> {
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(RelationError::InvalidIdentifier(format!(
                "{raw} is not a positive user id"
            )))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two distinct users ordered ascending. The only way to build one is
/// [`canonicalize`], so `low < high` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalPair {
    low: UserId,
    high: UserId,
}

impl CanonicalPair {
    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    /// The participant that is not `viewer`.
    pub fn other(&self, viewer: UserId) -> RelationResult<UserId> {
        counterpart_of(self.low, self.high, viewer)
    }
}

/// Orders two raw identifiers into the canonical key of a symmetric relation.
pub fn canonicalize(x: i64, y: i64) -> RelationResult<CanonicalPair> {
    let x = UserId::new(x)?;
    let y = UserId::new(y)?;
    canonical_pair(x, y)
}

pub(crate) fn canonical_pair(x: UserId, y: UserId) -> RelationResult<CanonicalPair> {
    reject_self(x, y)?;
    Ok(CanonicalPair {
        low: x.min(y),
        high: x.max(y),
    })
}

/// Both identifiers valid and different, direction preserved.
pub(crate) fn distinct(a: i64, b: i64) -> RelationResult<(UserId, UserId)> {
    let (a, b) = (UserId::new(a)?, UserId::new(b)?);
    reject_self(a, b)?;
    Ok((a, b))
}

fn reject_self(a: UserId, b: UserId) -> RelationResult<()> {
    if a == b {
        return Err(RelationError::InvalidIdentifier(format!(
            "user {a} cannot be paired with itself"
        )));
    }
    Ok(())
}

/// The other participant of a two-party record `(a, b)` as seen by `viewer`.
pub fn counterpart_of(a: UserId, b: UserId, viewer: UserId) -> RelationResult<UserId> {
    if viewer == a {
        Ok(b)
    } else if viewer == b {
        Ok(a)
    } else {
        Err(RelationError::NotAuthorized(format!(
            "user {viewer} is not a participant"
        )))
    }
}

/// Resolves the caller supplied by the authentication layer.
pub fn require_viewer(viewer: Option<i64>) -> RelationResult<UserId> {
    match viewer {
        Some(raw) => UserId::new(raw),
        None => Err(RelationError::NotAuthorized("no authenticated viewer".into())),
    }
}
