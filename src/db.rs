use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::AppConfig;

/// Connects and applies pending migrations. The service cannot run without
/// its store, so callers treat an error here as fatal.
pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("store unavailable: connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("store unavailable: run migrations")?;

    info!("database connected and migrated");
    Ok(db)
}
