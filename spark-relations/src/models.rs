use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::media;
use crate::schema::{blockers, likes, matches, profile_media, users, video_sessions};

// --- User (owned by the auth service, read-only here) ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub image_ref: Option<String>,
    pub is_available: bool,
    pub available_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What another user may see of a profile.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PublicProfile {
    pub id: i64,
    pub display_name: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub available_until: Option<DateTime<Utc>>,
}

impl PublicProfile {
    pub fn from_user(user: User, media_base_url: &str) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            image_url: user
                .image_ref
                .as_deref()
                .and_then(|r| media::resolve_url(media_base_url, r)),
            is_available: user.is_available,
            available_until: user.available_until,
        }
    }
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: i64,
    pub user_a_id: i64,
    pub user_b_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_a_id: i64,
    pub user_b_id: i64,
}

// --- Like ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: i64,
    pub liker_id: i64,
    pub liked_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub liker_id: i64,
    pub liked_id: i64,
}

// --- Blocker ---

#[derive(Debug, Insertable)]
#[diesel(table_name = blockers)]
pub struct NewBlocker {
    pub blocker_id: i64,
    pub blocked_id: i64,
}

// --- ProfileMedia ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = profile_media)]
pub struct ProfileMedia {
    pub id: i64,
    pub user_id: i64,
    pub media_type: String,
    pub url: String,
    pub sort_order: i32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MediaItem {
    pub id: i64,
    pub media_type: String,
    pub url: String,
    pub sort_order: i32,
}

impl MediaItem {
    pub fn from_media(item: ProfileMedia, media_base_url: &str) -> Self {
        let url = media::resolve_url(media_base_url, &item.url).unwrap_or(item.url);
        Self {
            id: item.id,
            media_type: item.media_type,
            url,
            sort_order: item.sort_order,
        }
    }
}

// --- VideoSession ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = video_sessions)]
pub struct VideoSession {
    pub id: i64,
    pub user_a_id: i64,
    pub user_b_id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cdn.spark.test/media";

    fn user(image_ref: Option<&str>) -> User {
        User {
            id: 4,
            display_name: "nova".into(),
            image_ref: image_ref.map(str::to_string),
            is_available: true,
            available_until: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn public_profile_resolves_image() {
        let profile = PublicProfile::from_user(user(Some("avatars/4.jpg")), BASE);
        assert_eq!(
            profile.image_url.as_deref(),
            Some("https://cdn.spark.test/media/avatars/4.jpg")
        );

        let profile = PublicProfile::from_user(user(None), BASE);
        assert_eq!(profile.image_url, None);
    }

    #[test]
    fn media_item_keeps_unresolvable_url() {
        let item = ProfileMedia {
            id: 1,
            user_id: 4,
            media_type: "photo".into(),
            url: "  ".into(),
            sort_order: 0,
        };
        assert_eq!(MediaItem::from_media(item, BASE).url, "  ");
    }
}
