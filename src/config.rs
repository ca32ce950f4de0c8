//! Typed runtime configuration, built once from the environment and passed
//! explicitly to the services that need it.

use crate::util::env::{env_flag, env_opt, env_parse};
use anyhow::{anyhow, Result};
use std::time::Duration;

pub const DEFAULT_STEAM_API_BASE: &str = "https://api.steampowered.com";

#[derive(Debug, Clone)]
pub struct SteamConfig {
    pub api_key: String,
    pub api_base: String,
    pub http_timeout: Duration,
    pub achievement_lang: String,
}

/// Retry and enrichment knobs for the catalog synchronizer.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub fetch_achievements: bool,
    pub achievement_concurrency: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            fetch_achievements: true,
            achievement_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_per_page: 20,
            max_per_page: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub steam: SteamConfig,
    pub sync: SyncSettings,
    pub query: QueryLimits,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::load(true)
    }

    /// Same as [`AppConfig::from_env`], but `STEAM_API_KEY` may be unset when
    /// `require_steam_key` is false. Such a config must not be used for Steam calls.
    pub fn load(require_steam_key: bool) -> Result<Self> {
        let defaults = SyncSettings::default();
        let limits = QueryLimits::default();

        let steam = SteamConfig {
            api_key: steam_api_key(env_opt("STEAM_API_KEY"), require_steam_key)?,
            api_base: env_opt("STEAM_API_BASE").unwrap_or_else(|| DEFAULT_STEAM_API_BASE.into()),
            http_timeout: Duration::from_secs(env_parse("STEAM_HTTP_TIMEOUT_SECS", 5u64)),
            achievement_lang: env_opt("STEAM_ACHIEVEMENT_LANG").unwrap_or_else(|| "en".into()),
        };

        let sync = SyncSettings {
            max_attempts: env_parse("STEAM_SYNC_MAX_ATTEMPTS", defaults.max_attempts).max(1),
            retry_delay: Duration::from_secs(env_parse(
                "STEAM_SYNC_RETRY_DELAY_SECS",
                defaults.retry_delay.as_secs(),
            )),
            fetch_achievements: env_flag("STEAM_FETCH_ACHIEVEMENTS", defaults.fetch_achievements),
            achievement_concurrency: env_parse(
                "STEAM_ACHIEVEMENT_CONCURRENCY",
                defaults.achievement_concurrency,
            )
            .max(1),
        };

        let max_per_page = env_parse("GAMES_MAX_PER_PAGE", limits.max_per_page).max(1);
        let query = QueryLimits {
            default_per_page: env_parse("GAMES_DEFAULT_PER_PAGE", limits.default_per_page)
                .clamp(1, max_per_page),
            max_per_page,
        };

        Ok(Self { steam, sync, query })
    }
}

fn steam_api_key(raw: Option<String>, required: bool) -> Result<String> {
    match raw {
        Some(key) => Ok(key),
        None if required => Err(anyhow!("missing env var STEAM_API_KEY")),
        None => Ok(String::new()),
    }
}
