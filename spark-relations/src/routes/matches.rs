use axum::extract::{Path, Query, State};
use axum::Json;
use std::sync::Arc;

use spark_shared::errors::AppResult;
use spark_shared::types::auth::AuthUser;
use spark_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::PublicProfile;
use crate::relations::{MatchLookup, UserId, VisibilityPolicy};
use crate::routes::db_conn;
use crate::services::listing_service::{self, MatchEntry};
use crate::services::profile_service;
use crate::AppState;

/// GET /matches - the caller's matches, newest first
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MatchEntry>>>> {
    let viewer = UserId::new(user.id)?;

    let mut conn = db_conn(&state)?;
    let page = listing_service::matches_page(&mut conn, viewer, &params, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(page)))
}

/// GET /matches/with/:other_id - a blocked user reads as missing
pub async fn match_status(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other_id): Path<i64>,
) -> AppResult<Json<ApiResponse<MatchLookup>>> {
    let lookup = VisibilityPolicy::new(&state.relations).visible_match(user.id, other_id)?;
    Ok(Json(ApiResponse::ok(lookup)))
}

/// GET /matches/:id/counterpart - who the caller matched with, if still visible
pub async fn match_counterpart(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let counterpart = VisibilityPolicy::new(&state.relations).visible_counterpart(match_id, user.id)?;

    let mut conn = db_conn(&state)?;
    let profile = profile_service::profile_of(&mut conn, counterpart, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(profile)))
}
