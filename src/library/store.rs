use crate::error::LibraryResult;
use crate::library::model::{Account, OwnedItem, SyncedItem};
use crate::library::query::ListQuery;
use crate::steam::SteamId;
use async_trait::async_trait;

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `EmailTaken` when the email is already registered.
    async fn create_account(&self, email: &str) -> LibraryResult<Account>;

    async fn find_by_id(&self, account_id: i64) -> LibraryResult<Option<Account>>;

    /// Returns `false` when no such account exists.
    async fn update_steam_id(&self, account_id: i64, steam_id: &SteamId) -> LibraryResult<bool>;
}

/// Per-account owned-game records.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Upserts every item keyed by `(account_id, appid)` as one atomic unit and
    /// returns the stored rows in input order. New rows get the default status
    /// and no tags; existing rows keep theirs.
    async fn upsert_items(
        &self,
        account_id: i64,
        items: &[SyncedItem],
    ) -> LibraryResult<Vec<OwnedItem>>;

    /// One page of items plus the total number of matching rows.
    async fn list_items(
        &self,
        account_id: i64,
        query: &ListQuery,
    ) -> LibraryResult<(Vec<OwnedItem>, i64)>;

    async fn update_status(
        &self,
        account_id: i64,
        appid: i64,
        status: &str,
    ) -> LibraryResult<Option<OwnedItem>>;

    async fn set_tags(
        &self,
        account_id: i64,
        appid: i64,
        tags: &[String],
    ) -> LibraryResult<Option<OwnedItem>>;
}
