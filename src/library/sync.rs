use crate::config::SyncSettings;
use crate::error::{LibraryError, LibraryResult};
use crate::library::model::{OwnedItem, SyncedItem};
use crate::library::store::{AccountStore, LibraryStore};
use crate::steam::{AchievementTally, OwnedGame, SteamApi, SteamId};
use futures::{stream, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Reconciles an account's Steam ownership listing into its local library.
///
/// All upstream calls finish before the store is touched, and the store writes
/// the whole batch in one transaction, so a failed sync leaves no trace. Titles
/// that disappear upstream are kept.
#[derive(Clone)]
pub struct CatalogSynchronizer {
    steam: Arc<dyn SteamApi>,
    accounts: Arc<dyn AccountStore>,
    library: Arc<dyn LibraryStore>,
    settings: SyncSettings,
}

impl CatalogSynchronizer {
    pub fn new(
        steam: Arc<dyn SteamApi>,
        accounts: Arc<dyn AccountStore>,
        library: Arc<dyn LibraryStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            steam,
            accounts,
            library,
            settings,
        }
    }

    #[instrument(skip(self))]
    pub async fn sync(&self, account_id: i64) -> LibraryResult<Vec<OwnedItem>> {
        let started = Instant::now();
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(LibraryError::AccountNotFound(account_id))?;
        let steam_id = account.linked_steam_id()?;

        let games = self.fetch_owned_games(&steam_id).await?;
        let batch = self.enrich(&steam_id, games).await;
        let stored = self.library.upsert_items(account.id, &batch).await?;

        info!(
            account_id,
            items = stored.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "library synced"
        );
        Ok(stored)
    }

    async fn fetch_owned_games(&self, steam_id: &SteamId) -> LibraryResult<Vec<OwnedGame>> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            match self.steam.owned_games(steam_id).await {
                Ok(games) => {
                    debug!(attempt, games = games.len(), "ownership listing fetched");
                    return Ok(games);
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "ownership listing attempt failed");
                    last_error = err.to_string();
                }
            }
            if attempt < max_attempts && !self.settings.retry_delay.is_zero() {
                tokio::time::sleep(self.settings.retry_delay).await;
            }
        }
        Err(LibraryError::UpstreamUnavailable {
            attempts: max_attempts,
            last_error,
        })
    }

    // Per-title achievement lookups; a failed lookup degrades to 0/0 for that title only.
    async fn enrich(&self, steam_id: &SteamId, games: Vec<OwnedGame>) -> Vec<SyncedItem> {
        if !self.settings.fetch_achievements {
            return games
                .into_iter()
                .map(|g| synced_item(g, AchievementTally::default()))
                .collect();
        }
        stream::iter(games)
            .map(|game| async move {
                let tally = match self.steam.achievement_tally(steam_id, game.appid).await {
                    Ok(tally) => tally,
                    Err(err) => {
                        debug!(appid = game.appid, error = %err, "achievements unavailable; using 0/0");
                        AchievementTally::default()
                    }
                };
                synced_item(game, tally)
            })
            .buffered(self.settings.achievement_concurrency.max(1))
            .collect()
            .await
    }
}

fn synced_item(game: OwnedGame, tally: AchievementTally) -> SyncedItem {
    SyncedItem {
        appid: game.appid,
        name: game.name,
        playtime_minutes: game.playtime_minutes,
        completion: tally.completion_ratio(),
    }
}
