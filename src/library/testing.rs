// In-memory doubles for the store and Steam traits, shared by unit tests.

use crate::error::{LibraryError, LibraryResult};
use crate::library::model::{Account, OwnedItem, SyncedItem, DEFAULT_STATUS};
use crate::library::query::{ListQuery, SortDir, SortKey};
use crate::library::store::{AccountStore, LibraryStore};
use crate::steam::{AchievementTally, OwnedGame, SteamApi, SteamId};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    // keyed by (account_id, appid)
    items: HashMap<(i64, i64), OwnedItem>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
    writes: AtomicU32,
    pub fail_upserts: AtomicBool,
}

impl MemoryStore {
    pub fn with_account(steam_id: Option<&str>) -> (Self, i64) {
        let store = Self::default();
        let id = {
            let mut state = store.state.lock().unwrap();
            let id = state.accounts.len() as i64 + 1;
            state.accounts.push(Account {
                id,
                email: format!("user{id}@example.com"),
                steam_id: steam_id.map(str::to_string),
                created_at: Utc::now(),
            });
            id
        };
        (store, id)
    }

    /// Number of mutating calls that changed state.
    pub fn writes(&self) -> u32 {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Every item of an account, ordered by appid.
    pub fn snapshot(&self, account_id: i64) -> Vec<OwnedItem> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<OwnedItem> = state
            .items
            .iter()
            .filter(|((acct, _), _)| *acct == account_id)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by_key(|i| i.appid);
        items
    }

    pub fn steam_id_of(&self, account_id: i64) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .and_then(|a| a.steam_id.clone())
    }
}

fn compare(a: &OwnedItem, b: &OwnedItem, sort: SortKey, order: SortDir) -> Ordering {
    let primary = match sort {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Playtime => a.playtime_minutes.cmp(&b.playtime_minutes),
        SortKey::Completion => a
            .completion
            .partial_cmp(&b.completion)
            .unwrap_or(Ordering::Equal),
    };
    let primary = match order {
        SortDir::Asc => primary,
        SortDir::Desc => primary.reverse(),
    };
    primary.then(a.appid.cmp(&b.appid))
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, email: &str) -> LibraryResult<Account> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.iter().any(|a| a.email == email) {
            return Err(LibraryError::EmailTaken(email.to_string()));
        }
        let account = Account {
            id: state.accounts.len() as i64 + 1,
            email: email.to_string(),
            steam_id: None,
            created_at: Utc::now(),
        };
        state.accounts.push(account.clone());
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(account)
    }

    async fn find_by_id(&self, account_id: i64) -> LibraryResult<Option<Account>> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().find(|a| a.id == account_id).cloned())
    }

    async fn update_steam_id(&self, account_id: i64, steam_id: &SteamId) -> LibraryResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.accounts.iter_mut().find(|a| a.id == account_id) {
            Some(account) => {
                account.steam_id = Some(steam_id.to_string());
                self.writes.fetch_add(1, AtomicOrdering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn upsert_items(
        &self,
        account_id: i64,
        items: &[SyncedItem],
    ) -> LibraryResult<Vec<OwnedItem>> {
        if self.fail_upserts.load(AtomicOrdering::SeqCst) {
            return Err(LibraryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut state = self.state.lock().unwrap();
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            let row = state
                .items
                .entry((account_id, item.appid))
                .or_insert_with(|| OwnedItem {
                    appid: item.appid,
                    name: String::new(),
                    playtime_minutes: 0,
                    status: DEFAULT_STATUS.to_string(),
                    completion: 0.0,
                    tags: Vec::new(),
                });
            row.name = item.name.clone();
            row.playtime_minutes = item.playtime_minutes;
            row.completion = item.completion;
            stored.push(row.clone());
        }
        if !items.is_empty() {
            self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        }
        Ok(stored)
    }

    async fn list_items(
        &self,
        account_id: i64,
        query: &ListQuery,
    ) -> LibraryResult<(Vec<OwnedItem>, i64)> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<OwnedItem> = state
            .items
            .iter()
            .filter(|((acct, _), item)| {
                *acct == account_id
                    && query
                        .tag
                        .as_ref()
                        .map_or(true, |tag| item.tags.iter().any(|t| t == tag))
            })
            .map(|(_, item)| item.clone())
            .collect();
        matching.sort_by(|a, b| compare(a, b, query.sort, query.order));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_status(
        &self,
        account_id: i64,
        appid: i64,
        status: &str,
    ) -> LibraryResult<Option<OwnedItem>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.items.get_mut(&(account_id, appid)).map(|item| {
            item.status = status.to_string();
            self.writes.fetch_add(1, AtomicOrdering::SeqCst);
            item.clone()
        }))
    }

    async fn set_tags(
        &self,
        account_id: i64,
        appid: i64,
        tags: &[String],
    ) -> LibraryResult<Option<OwnedItem>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.items.get_mut(&(account_id, appid)).map(|item| {
            item.tags = tags.to_vec();
            self.writes.fetch_add(1, AtomicOrdering::SeqCst);
            item.clone()
        }))
    }
}

/// Scripted Steam double. Listing calls fail while `listing_failures` is
/// non-zero; achievement lookups for appids mapped to `None` fail as malformed.
#[derive(Default)]
pub(crate) struct FakeSteam {
    pub games: Mutex<Vec<OwnedGame>>,
    pub listing_failures: AtomicU32,
    pub achievements: Mutex<HashMap<i64, Option<AchievementTally>>>,
    pub vanity: Mutex<HashMap<String, String>>,
    pub listing_calls: AtomicU32,
    pub achievement_calls: AtomicU32,
    pub vanity_calls: AtomicU32,
}

impl FakeSteam {
    pub fn with_games(games: &[(i64, &str, i64)]) -> Self {
        let fake = Self::default();
        *fake.games.lock().unwrap() = games
            .iter()
            .map(|(appid, name, playtime)| OwnedGame {
                appid: *appid,
                name: name.to_string(),
                playtime_minutes: *playtime,
            })
            .collect();
        fake
    }

    pub fn set_achievements(&self, appid: i64, tally: Option<(u32, u32)>) {
        self.achievements.lock().unwrap().insert(
            appid,
            tally.map(|(unlocked, total)| AchievementTally { unlocked, total }),
        );
    }

    pub fn calls(&self) -> (u32, u32, u32) {
        (
            self.listing_calls.load(AtomicOrdering::SeqCst),
            self.achievement_calls.load(AtomicOrdering::SeqCst),
            self.vanity_calls.load(AtomicOrdering::SeqCst),
        )
    }
}

#[async_trait]
impl SteamApi for FakeSteam {
    async fn owned_games(&self, _steam_id: &SteamId) -> LibraryResult<Vec<OwnedGame>> {
        self.listing_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let remaining = self.listing_failures.load(AtomicOrdering::SeqCst);
        if remaining > 0 {
            self.listing_failures.store(remaining - 1, AtomicOrdering::SeqCst);
            return Err(LibraryError::UpstreamStatus {
                endpoint: "GetOwnedGames",
                status: 503,
            });
        }
        Ok(self.games.lock().unwrap().clone())
    }

    async fn achievement_tally(
        &self,
        _steam_id: &SteamId,
        appid: i64,
    ) -> LibraryResult<AchievementTally> {
        self.achievement_calls.fetch_add(1, AtomicOrdering::SeqCst);
        match self.achievements.lock().unwrap().get(&appid) {
            Some(Some(tally)) => Ok(*tally),
            Some(None) => Err(LibraryError::malformed("GetPlayerAchievements", "bad json")),
            None => Ok(AchievementTally::default()),
        }
    }

    async fn resolve_vanity(&self, vanity: &str) -> LibraryResult<Option<String>> {
        self.vanity_calls.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.vanity.lock().unwrap().get(vanity).cloned())
    }
}
