use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Connection, PgPool};

use crate::config::DbConfig;

/// Opens the pool and verifies liveness with a ping round trip.
pub async fn connect(config: &DbConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.query_timeout())
        .connect(&config.url)
        .await
        .context("connect to database")?;

    let mut conn = db.acquire().await.context("acquire connection for ping")?;
    conn.ping().await.context("ping database")?;
    tracing::info!(max_connections = config.max_connections, "database connection verified");

    Ok(db)
}

pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        tracing::warn!(error = %e, "schema migration failed; continuing with existing schema");
    }
}
