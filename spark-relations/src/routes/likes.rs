use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use spark_shared::errors::{AppError, AppResult};
use spark_shared::types::auth::AuthUser;
use spark_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::events::publisher;
use crate::relations::{canonicalize, UserId};
use crate::routes::db_conn;
use crate::services::like_service::{self, LikeOutcome};
use crate::services::listing_service::{self, LikerEntry};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SendLikeRequest {
    #[validate(range(min = 1, message = "liked_id must be a positive user id"))]
    pub liked_id: i64,
}

// --- POST /likes ---

pub async fn send_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendLikeRequest>,
) -> AppResult<Json<ApiResponse<LikeOutcome>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = db_conn(&state)?;
    let outcome = like_service::record_like(&mut conn, &state.relations, user.id, req.liked_id)?;

    if outcome.created {
        publisher::publish_like_sent(&state.rabbitmq, outcome.like.id, user.id, req.liked_id).await;
    }

    // Only the request that wrote the match row announces it.
    if let (Some(match_id), true) = (outcome.match_id, outcome.match_created) {
        let pair = canonicalize(user.id, req.liked_id)?;
        publisher::publish_match_created(&state.rabbitmq, match_id, pair.low().get(), pair.high().get()).await;
    }

    Ok(Json(ApiResponse::ok(outcome)))
}

#[derive(Debug, Serialize)]
pub struct LikeCheckResponse {
    pub already_liked: bool,
}

/// GET /likes/check/:target_id - check if current user already liked target
pub async fn check_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> AppResult<Json<ApiResponse<LikeCheckResponse>>> {
    let viewer = UserId::new(user.id)?;
    let target = UserId::new(target_id)?;

    let mut conn = db_conn(&state)?;
    let already_liked = like_service::liked_by(&mut conn, viewer.get(), target.get())?;

    Ok(Json(ApiResponse::ok(LikeCheckResponse { already_liked })))
}

/// GET /likes/received - users who liked the caller, newest first
pub async fn list_received(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<LikerEntry>>>> {
    let viewer = UserId::new(user.id)?;

    let mut conn = db_conn(&state)?;
    let page = listing_service::likers_page(&mut conn, viewer, &params, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(page)))
}
