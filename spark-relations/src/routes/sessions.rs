use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use spark_shared::errors::AppResult;
use spark_shared::types::auth::AuthUser;
use spark_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::relations::UserId;
use crate::routes::db_conn;
use crate::services::listing_service::{self, PastSessionEntry};
use crate::AppState;

/// GET /sessions/past - ended video sessions, most recent first
pub async fn list_past_sessions(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<PastSessionEntry>>>> {
    let viewer = UserId::new(user.id)?;

    let mut conn = db_conn(&state)?;
    let page = listing_service::past_sessions_page(&mut conn, viewer, &params, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(page)))
}
