//! Relationship & visibility core: who is matched with whom, who is hidden from
//! whom, and the predicate every cross-user read goes through.

pub mod blocks;
pub mod error;
pub mod identity;
pub mod matches;
pub mod memory;
pub mod pg;
pub mod store;
pub mod visibility;

pub use blocks::BlockRegistry;
pub use error::{RelationError, RelationResult, Resource};
pub use identity::{canonicalize, counterpart_of, require_viewer, CanonicalPair, UserId};
pub use matches::{EnsuredMatch, MatchLookup, MatchRegistry};
pub use pg::PgRelationStore;
pub use store::{MatchId, RelationStore};
pub use visibility::VisibilityPolicy;
