use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use spark_shared::errors::{AppError, AppResult};
use spark_shared::types::ApiResponse;

use crate::events::publisher;
use crate::relations::{canonicalize, MatchRegistry, UserId, VisibilityPolicy};
use crate::routes::db_conn;
use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMatchRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(range(min = 1))]
    pub other_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateMatchResponse {
    pub match_id: i64,
    pub user_a_id: i64,
    pub user_b_id: i64,
    pub created: bool,
}

/// POST /internal/matches - record a match between two users (service-to-service, no auth)
pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMatchRequest>,
) -> AppResult<Json<ApiResponse<CreateMatchResponse>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let pair = canonicalize(req.user_id, req.other_id)?;

    // Unknown users are a 404, not a constraint failure on insert.
    let mut conn = db_conn(&state)?;
    profile_service::ensure_exists(&mut conn, pair.low())?;
    profile_service::ensure_exists(&mut conn, pair.high())?;
    drop(conn);

    let ensured = MatchRegistry::new(&state.relations).ensure_match(req.user_id, req.other_id)?;
    if ensured.created {
        publisher::publish_match_created(&state.rabbitmq, ensured.match_id, pair.low().get(), pair.high().get()).await;
    }

    Ok(Json(ApiResponse::ok(CreateMatchResponse {
        match_id: ensured.match_id,
        user_a_id: pair.low().get(),
        user_b_id: pair.high().get(),
        created: ensured.created,
    })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct FilterVisibleRequest {
    #[validate(range(min = 1))]
    pub viewer_id: i64,
    #[validate(length(max = 1000))]
    pub candidate_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct FilterVisibleResponse {
    pub visible_ids: Vec<i64>,
}

/// POST /internal/visibility/filter - drop candidates hidden from the viewer (service-to-service, no auth)
pub async fn filter_visible(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterVisibleRequest>,
) -> AppResult<Json<ApiResponse<FilterVisibleResponse>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let visible = VisibilityPolicy::new(&state.relations).filter_listing(req.viewer_id, &req.candidate_ids)?;

    Ok(Json(ApiResponse::ok(FilterVisibleResponse {
        visible_ids: visible.into_iter().map(UserId::get).collect(),
    })))
}
