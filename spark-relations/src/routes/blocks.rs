use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use spark_shared::errors::AppResult;
use spark_shared::types::auth::AuthUser;
use spark_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::PublicProfile;
use crate::relations::{BlockRegistry, UserId};
use crate::routes::db_conn;
use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub blocked_id: i64,
    pub changed: bool,
}

// --- POST /blocks/:id ---

pub async fn block_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> AppResult<Json<ApiResponse<BlockResponse>>> {
    let target = UserId::new(target_id)?;

    let mut conn = db_conn(&state)?;
    profile_service::ensure_exists(&mut conn, target)?;
    drop(conn);

    let changed = BlockRegistry::new(&state.relations).block(user.id, target.get())?;
    if changed {
        publisher::publish_user_blocked(&state.rabbitmq, user.id, target.get()).await;
    }

    Ok(Json(ApiResponse::ok(BlockResponse {
        blocked_id: target.get(),
        changed,
    })))
}

// --- DELETE /blocks/:id ---

pub async fn unblock_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i64>,
) -> AppResult<Json<ApiResponse<BlockResponse>>> {
    let changed = BlockRegistry::new(&state.relations).unblock(user.id, target_id)?;
    if changed {
        publisher::publish_user_unblocked(&state.rabbitmq, user.id, target_id).await;
    }

    Ok(Json(ApiResponse::ok(BlockResponse {
        blocked_id: target_id,
        changed,
    })))
}

/// GET /blocks - users the caller blocked, most recent first
pub async fn list_blocked(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let blocked = BlockRegistry::new(&state.relations).blocked_by(user.id)?;

    let mut conn = db_conn(&state)?;
    let profiles = profile_service::profiles_in_order(&mut conn, &blocked, &state.config.media_base_url)?;

    Ok(Json(ApiResponse::ok(profiles)))
}
