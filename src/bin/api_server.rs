// HTTP API server binary for steam-backlog

use anyhow::Result;
use steam_backlog::api::ApiServer;
use steam_backlog::config::AppConfig;
use steam_backlog::util::db::Db;
use steam_backlog::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    steam_backlog::tracing::init_tracing("info,sqlx=warn")?;

    tracing::info!("Initializing steam-backlog API server");

    // Load dotenv/env once (safe to call multiple times)
    env_util::init_env();
    env_util::preflight_check(
        "api_server",
        &["STEAM_API_KEY", "API_SECRET"],
        &[
            "DATABASE_URL",
            "STEAM_API_BASE",
            "STEAM_SYNC_MAX_ATTEMPTS",
            "STEAM_SYNC_RETRY_DELAY_SECS",
            "API_HOST",
            "API_PORT",
            "AUTO_MIGRATE",
        ],
    )?;

    let server = ApiServer::from_env()?;
    let config = AppConfig::from_env()?;

    let database_url = env_util::db_url()?;
    let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 10u32);
    let db = Db::connect(&database_url, max_connections).await?;

    tracing::info!("Database connected successfully");

    let library = steam_backlog::steam_library(config, &db)?;
    server.run(db, library).await?;

    Ok(())
}
