use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use spark_shared::clients::db;
use spark_shared::types::api::{HealthCheck, HealthResponse};

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match db::ping(&state.db) {
        Ok(()) => HealthCheck::healthy("database"),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            HealthCheck::unhealthy("database", e)
        }
    };

    Json(HealthResponse::healthy("spark-relations", env!("CARGO_PKG_VERSION")).with_checks(vec![database]))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
