use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::models::{MediaItem, ProfileMedia, PublicProfile, User};
use crate::relations::{RelationError, RelationResult, RelationStore, Resource, UserId, VisibilityPolicy};
use crate::schema::{profile_media, users};

/// Loads `target_id` as seen by `viewer`. Blocked and missing users are indistinguishable.
pub fn visible_profile<S: RelationStore + ?Sized>(
    conn: &mut PgConnection,
    store: &S,
    viewer: UserId,
    target_id: i64,
    media_base_url: &str,
) -> RelationResult<PublicProfile> {
    if !VisibilityPolicy::new(store).can_view(viewer.get(), target_id)? {
        tracing::debug!(viewer_id = %viewer, target_id, "profile hidden by block");
        return Err(RelationError::NotFound(Resource::User));
    }

    profile_of(conn, UserId::new(target_id)?, media_base_url)
}

/// Loads a profile without any visibility check; callers gate it first.
pub fn profile_of(conn: &mut PgConnection, user_id: UserId, media_base_url: &str) -> RelationResult<PublicProfile> {
    let user = users::table
        .find(user_id.get())
        .first::<User>(conn)
        .optional()?
        .ok_or(RelationError::NotFound(Resource::User))?;

    Ok(PublicProfile::from_user(user, media_base_url))
}

/// Fails with `NotFound(User)` when no account carries `user_id`.
pub fn ensure_exists(conn: &mut PgConnection, user_id: UserId) -> RelationResult<()> {
    let found: bool = diesel::select(diesel::dsl::exists(users::table.find(user_id.get()))).get_result(conn)?;
    if found {
        Ok(())
    } else {
        Err(RelationError::NotFound(Resource::User))
    }
}

/// Public profiles for `ids`, in the order given. Ids without an account are skipped.
pub fn profiles_in_order(
    conn: &mut PgConnection,
    ids: &[UserId],
    media_base_url: &str,
) -> RelationResult<Vec<PublicProfile>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
    let mut by_id: HashMap<i64, User> = users::table
        .filter(users::id.eq_any(&raw))
        .load::<User>(conn)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(raw
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|user| PublicProfile::from_user(user, media_base_url))
        .collect())
}

/// Media of a visible profile in display order (`sort_order`, then id).
pub fn visible_media<S: RelationStore + ?Sized>(
    conn: &mut PgConnection,
    store: &S,
    viewer: UserId,
    target_id: i64,
    media_base_url: &str,
) -> RelationResult<Vec<MediaItem>> {
    let profile = visible_profile(conn, store, viewer, target_id, media_base_url)?;

    let items = profile_media::table
        .filter(profile_media::user_id.eq(profile.id))
        .order((profile_media::sort_order.asc(), profile_media::id.asc()))
        .load::<ProfileMedia>(conn)?;

    Ok(items
        .into_iter()
        .map(|item| MediaItem::from_media(item, media_base_url))
        .collect())
}
