pub mod config;
pub mod events;
pub mod media;
pub mod models;
pub mod relations;
pub mod routes;
pub mod schema;
pub mod services;

use metrics_exporter_prometheus::PrometheusHandle;

use spark_shared::clients::db::DbPool;
use spark_shared::clients::rabbitmq::RabbitMQClient;
use spark_shared::middleware::{AuthState, JwtKeys};

use crate::config::AppConfig;
use crate::relations::PgRelationStore;

pub struct AppState {
    pub db: DbPool,
    pub relations: PgRelationStore,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub jwt: JwtKeys,
    pub metrics_handle: PrometheusHandle,
}

impl AuthState for AppState {
    fn jwt_keys(&self) -> &JwtKeys {
        &self.jwt
    }
}
