pub mod blocks;
pub mod health;
pub mod internal;
pub mod likes;
pub mod matches;
pub mod profiles;
pub mod sessions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use spark_shared::clients::db::DbConn;
use spark_shared::errors::AppResult;
use spark_shared::middleware::metrics_middleware;

use crate::relations::RelationError;
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/likes", post(likes::send_like))
        .route("/likes/check/:target_id", get(likes::check_like))
        .route("/likes/received", get(likes::list_received))
        .route("/blocks", get(blocks::list_blocked))
        .route("/blocks/:id", post(blocks::block_user).delete(blocks::unblock_user))
        .route("/matches", get(matches::list_matches))
        .route("/matches/with/:other_id", get(matches::match_status))
        .route("/matches/:id/counterpart", get(matches::match_counterpart))
        .route("/profiles/:id", get(profiles::get_profile))
        .route("/profiles/:id/media", get(profiles::get_media))
        .route("/sessions/past", get(sessions::list_past_sessions))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/matches", post(internal::create_match))
        .route("/internal/visibility/filter", post(internal::filter_visible))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Checks out a pooled connection; an exhausted or unreachable pool is a storage outage.
pub(crate) fn db_conn(state: &AppState) -> AppResult<DbConn> {
    state.db.get().map_err(|e| RelationError::from(e).into())
}
