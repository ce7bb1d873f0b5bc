use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use serde::Serialize;

use spark_shared::types::{Paginated, PaginationParams};

use crate::models::{Like, Match, PublicProfile, User, VideoSession};
use crate::relations::{counterpart_of, RelationResult, UserId};
use crate::schema::{blockers, likes, matches, users, video_sessions};

/// `$column` holds a user that shares no block row with `$viewer`, in either
/// direction. Evaluated by Postgres, so counts and pages never see hidden users.
macro_rules! visible_to {
    ($viewer:expr, $column:expr) => {
        $column
            .ne_all(
                blockers::table
                    .filter(blockers::blocker_id.eq($viewer))
                    .select(blockers::blocked_id),
            )
            .and($column.ne_all(
                blockers::table
                    .filter(blockers::blocked_id.eq($viewer))
                    .select(blockers::blocker_id),
            ))
    };
}

#[derive(Debug, Serialize)]
pub struct LikerEntry {
    pub profile: PublicProfile,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MatchEntry {
    pub match_id: i64,
    pub counterpart: PublicProfile,
    pub matched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PastSessionEntry {
    pub session_id: i64,
    pub counterpart: PublicProfile,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i32>,
}

// Each listing's count and page are built from the same filtered query.

fn likers_of(viewer_id: i64) -> likes::BoxedQuery<'static, Pg> {
    likes::table
        .filter(likes::liked_id.eq(viewer_id))
        .filter(visible_to!(viewer_id, likes::liker_id))
        .into_boxed()
}

fn likers_rows(viewer_id: i64, params: &PaginationParams) -> likes::BoxedQuery<'static, Pg> {
    likers_of(viewer_id)
        .order((likes::created_at.desc(), likes::id.desc()))
        .offset(params.sql_offset())
        .limit(params.sql_limit())
}

fn matches_of(viewer_id: i64) -> matches::BoxedQuery<'static, Pg> {
    matches::table
        .filter(matches::user_a_id.eq(viewer_id).or(matches::user_b_id.eq(viewer_id)))
        .filter(visible_to!(viewer_id, matches::user_a_id))
        .filter(visible_to!(viewer_id, matches::user_b_id))
        .into_boxed()
}

fn matches_rows(viewer_id: i64, params: &PaginationParams) -> matches::BoxedQuery<'static, Pg> {
    matches_of(viewer_id)
        .order((matches::created_at.desc(), matches::id.desc()))
        .offset(params.sql_offset())
        .limit(params.sql_limit())
}

fn ended_sessions_of(viewer_id: i64) -> video_sessions::BoxedQuery<'static, Pg> {
    video_sessions::table
        .filter(video_sessions::user_a_id.eq(viewer_id).or(video_sessions::user_b_id.eq(viewer_id)))
        .filter(video_sessions::ended_at.is_not_null())
        .filter(visible_to!(viewer_id, video_sessions::user_a_id))
        .filter(visible_to!(viewer_id, video_sessions::user_b_id))
        .into_boxed()
}

fn ended_sessions_rows(viewer_id: i64, params: &PaginationParams) -> video_sessions::BoxedQuery<'static, Pg> {
    ended_sessions_of(viewer_id)
        .order((video_sessions::ended_at.desc(), video_sessions::id.desc()))
        .offset(params.sql_offset())
        .limit(params.sql_limit())
}

/// Users who liked `viewer`, newest like first.
pub fn likers_page(
    conn: &mut PgConnection,
    viewer: UserId,
    params: &PaginationParams,
    media_base_url: &str,
) -> RelationResult<Paginated<LikerEntry>> {
    let total: i64 = likers_of(viewer.get()).count().get_result(conn)?;
    let rows: Vec<Like> = likers_rows(viewer.get(), params).load(conn)?;

    let likers = rows
        .iter()
        .map(|like| UserId::new(like.liker_id))
        .collect::<RelationResult<Vec<_>>>()?;
    let mut profiles = load_profiles(conn, &likers)?;

    let items = rows
        .into_iter()
        .zip(likers)
        .filter_map(|(like, liker)| {
            profiles.remove(&liker).map(|user| LikerEntry {
                profile: PublicProfile::from_user(user, media_base_url),
                liked_at: like.created_at,
            })
        })
        .collect();

    Ok(Paginated::new(items, total as u64, params))
}

/// Matches of `viewer` with a still-visible counterpart, newest first.
pub fn matches_page(
    conn: &mut PgConnection,
    viewer: UserId,
    params: &PaginationParams,
    media_base_url: &str,
) -> RelationResult<Paginated<MatchEntry>> {
    let total: i64 = matches_of(viewer.get()).count().get_result(conn)?;
    let rows: Vec<Match> = matches_rows(viewer.get(), params).load(conn)?;

    let counterparts = rows
        .iter()
        .map(|m| counterpart(m.user_a_id, m.user_b_id, viewer))
        .collect::<RelationResult<Vec<_>>>()?;
    let mut profiles = load_profiles(conn, &counterparts)?;

    let items = rows
        .into_iter()
        .zip(counterparts)
        .filter_map(|(m, other)| {
            profiles.remove(&other).map(|user| MatchEntry {
                match_id: m.id,
                counterpart: PublicProfile::from_user(user, media_base_url),
                matched_at: m.created_at,
            })
        })
        .collect();

    Ok(Paginated::new(items, total as u64, params))
}

/// Ended video sessions of `viewer`, most recently ended first.
pub fn past_sessions_page(
    conn: &mut PgConnection,
    viewer: UserId,
    params: &PaginationParams,
    media_base_url: &str,
) -> RelationResult<Paginated<PastSessionEntry>> {
    let total: i64 = ended_sessions_of(viewer.get()).count().get_result(conn)?;
    let rows: Vec<VideoSession> = ended_sessions_rows(viewer.get(), params).load(conn)?;

    let counterparts = rows
        .iter()
        .map(|s| counterpart(s.user_a_id, s.user_b_id, viewer))
        .collect::<RelationResult<Vec<_>>>()?;
    let profiles = load_profiles(conn, &counterparts)?;

    // A user may appear in several sessions, so profiles are cloned rather than taken.
    let items = rows
        .into_iter()
        .zip(counterparts)
        .filter_map(|(s, other)| {
            profiles.get(&other).map(|user| PastSessionEntry {
                session_id: s.id,
                counterpart: PublicProfile::from_user(user.clone(), media_base_url),
                started_at: s.started_at,
                ended_at: s.ended_at,
                duration_secs: s.duration_secs,
            })
        })
        .collect();

    Ok(Paginated::new(items, total as u64, params))
}

fn counterpart(a: i64, b: i64, viewer: UserId) -> RelationResult<UserId> {
    counterpart_of(UserId::new(a)?, UserId::new(b)?, viewer)
}

fn load_profiles(conn: &mut PgConnection, ids: &[UserId]) -> RelationResult<HashMap<UserId, User>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
    let found: Vec<User> = users::table.filter(users::id.eq_any(&raw)).load(conn)?;

    found
        .into_iter()
        .map(|user| Ok((UserId::new(user.id)?, user)))
        .collect()
}
