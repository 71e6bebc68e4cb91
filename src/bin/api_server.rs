// HTTP API server binary for the Tucheki trailer streaming backend

use anyhow::Result;
use tucheki::api::ApiServer;
use tucheki::db::Db;
use tucheki::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    tucheki::tracing::init_tracing("info,sqlx=warn")?;

    tracing::info!("Initializing tucheki API server");

    // Load dotenv/env once (safe to call multiple times)
    env_util::init_env();
    env_util::preflight_check(
        "tucheki-api",
        &["JWT_SECRET"],
        &["API_HOST", "API_PORT", "DATABASE_URL", "ALLOWED_ORIGINS", "STORAGE_URL"],
    )?;

    // Load configuration from environment
    let server = ApiServer::from_env()?;

    // Initialize database connection
    let database_url = env_util::db_url()?;
    let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 10u32);
    let db = Db::connect(&database_url, max_connections).await?;

    tracing::info!("Database connected successfully");

    // Start HTTP server
    server.run(db).await?;

    Ok(())
}
