use std::sync::Arc;

use spark_relations::config::AppConfig;
use spark_relations::relations::PgRelationStore;
use spark_relations::{routes, AppState};
use spark_shared::clients::db;
use spark_shared::clients::rabbitmq::RabbitMQClient;
use spark_shared::middleware::JwtKeys;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    spark_shared::middleware::init_tracing("spark-relations");

    let config = AppConfig::load()?;
    let port = config.port;

    let pool = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let metrics_handle = spark_shared::middleware::init_metrics()?;
    let jwt = JwtKeys::from_secret(&config.jwt_secret);

    let state = Arc::new(AppState {
        relations: PgRelationStore::new(pool.clone()),
        db: pool,
        config,
        rabbitmq,
        jwt,
        metrics_handle,
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "spark-relations starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
