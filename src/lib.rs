//! Steam game backlog: links an account to a Steam identity, mirrors its owned
//! games into Postgres, and serves a sortable, filterable, paginated view.

pub mod api;
pub mod config;
pub mod database_ops;
pub mod error;
pub mod library;
pub mod steam;
pub mod tracing;

pub mod util {
    pub mod db;
    pub mod env;
}

use crate::config::AppConfig;
use crate::library::Library;
use crate::steam::SteamWebClient;
use crate::util::db::Db;
use std::sync::Arc;

/// Wires the Steam Web API client and the Postgres stores into a [`Library`].
pub fn steam_library(config: AppConfig, db: &Db) -> anyhow::Result<Library> {
    let steam = Arc::new(SteamWebClient::new(&config.steam)?);
    let store = Arc::new(db.clone());
    Ok(Library::new(config, steam, store.clone(), store))
}
