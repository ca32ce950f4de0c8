//! Per-account game library: Steam sync, identity linking, listing and user edits.

pub mod identity;
pub mod model;
pub mod query;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::AppConfig;
use crate::error::{LibraryError, LibraryResult};
use crate::steam::SteamApi;
use std::sync::Arc;
use tracing::{info, instrument};

pub use identity::{IdentityLinker, LinkRequest};
pub use model::{Account, OwnedItem};
pub use query::{ListQuery, Page, QueryService};
pub use store::{AccountStore, LibraryStore};
pub use sync::CatalogSynchronizer;

/// Everything a request handler or CLI command needs, wired once at startup.
#[derive(Clone)]
pub struct Library {
    pub synchronizer: CatalogSynchronizer,
    pub linker: IdentityLinker,
    pub query: QueryService,
    accounts: Arc<dyn AccountStore>,
    store: Arc<dyn LibraryStore>,
    config: AppConfig,
}

impl Library {
    pub fn new(
        config: AppConfig,
        steam: Arc<dyn SteamApi>,
        accounts: Arc<dyn AccountStore>,
        store: Arc<dyn LibraryStore>,
    ) -> Self {
        Self {
            synchronizer: CatalogSynchronizer::new(
                steam.clone(),
                accounts.clone(),
                store.clone(),
                config.sync.clone(),
            ),
            linker: IdentityLinker::new(steam, accounts.clone()),
            query: QueryService::new(store.clone()),
            accounts,
            store,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[instrument(skip(self))]
    pub async fn create_account(&self, email: &str) -> LibraryResult<Account> {
        let email = model::normalize_email(email)?;
        let account = self.accounts.create_account(&email).await?;
        info!(account_id = account.id, "account created");
        Ok(account)
    }

    pub async fn account(&self, account_id: i64) -> LibraryResult<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(LibraryError::AccountNotFound(account_id))
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        account_id: i64,
        appid: i64,
        status: &str,
    ) -> LibraryResult<OwnedItem> {
        let status = model::normalize_status(status)?;
        self.store
            .update_status(account_id, appid, &status)
            .await?
            .ok_or(LibraryError::GameNotFound { account_id, appid })
    }

    #[instrument(skip(self, tags))]
    pub async fn set_tags<S: AsRef<str> + Sync>(
        &self,
        account_id: i64,
        appid: i64,
        tags: &[S],
    ) -> LibraryResult<OwnedItem> {
        let tags = model::normalize_tags(tags);
        self.store
            .set_tags(account_id, appid, &tags)
            .await?
            .ok_or(LibraryError::GameNotFound { account_id, appid })
    }
}
