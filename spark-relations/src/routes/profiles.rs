use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use spark_shared::errors::AppResult;
use spark_shared::middleware::OptionalAuthUser;
use spark_shared::types::auth::AuthUser;
use spark_shared::types::ApiResponse;

use crate::models::{MediaItem, PublicProfile};
use crate::relations::{require_viewer, UserId};
use crate::routes::db_conn;
use crate::services::profile_service;
use crate::AppState;

// --- GET /profiles/:id ---

pub async fn get_profile(
    OptionalAuthUser(user): OptionalAuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let viewer = require_viewer(user.map(|u| u.id))?;

    let mut conn = db_conn(&state)?;
    let profile =
        profile_service::visible_profile(&mut conn, &state.relations, viewer, target_id, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /profiles/:id/media ---

pub async fn get_media(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<MediaItem>>>> {
    let viewer = UserId::new(user.id)?;

    let mut conn = db_conn(&state)?;
    let media =
        profile_service::visible_media(&mut conn, &state.relations, viewer, target_id, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(media)))
}
