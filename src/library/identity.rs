use crate::error::{LibraryError, LibraryResult};
use crate::library::store::AccountStore;
use crate::steam::{SteamApi, SteamId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

const COMMUNITY_HOST: &str = "steamcommunity.com";

/// What the user typed into the "link Steam" form. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub steam_id64: Option<String>,
}

/// A recognized community profile URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRef {
    /// `/id/<name>`: needs a ResolveVanityURL round trip.
    Vanity(String),
    /// `/profiles/<steamid64>`
    Numeric(String),
}

impl ProfileRef {
    pub fn parse(raw: &str) -> LibraryResult<Self> {
        let invalid = || LibraryError::InvalidProfileUrl(raw.to_string());
        let trimmed = raw.trim();
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
        let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
        if host != COMMUNITY_HOST && !host.ends_with(".steamcommunity.com") {
            return Err(invalid());
        }
        let mut segments = url
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|s| !s.is_empty());
        match (segments.next(), segments.next()) {
            (Some("id"), Some(name)) => Ok(ProfileRef::Vanity(name.to_string())),
            (Some("profiles"), Some(id)) => Ok(ProfileRef::Numeric(id.to_string())),
            _ => Err(invalid()),
        }
    }
}

/// Resolves and stores the Steam identity an account syncs from.
#[derive(Clone)]
pub struct IdentityLinker {
    steam: Arc<dyn SteamApi>,
    accounts: Arc<dyn AccountStore>,
}

impl IdentityLinker {
    pub fn new(steam: Arc<dyn SteamApi>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { steam, accounts }
    }

    #[instrument(skip(self, request))]
    pub async fn link_identity(
        &self,
        account_id: i64,
        request: &LinkRequest,
    ) -> LibraryResult<SteamId> {
        let steam_id = self.resolve(request).await?;
        if !self.accounts.update_steam_id(account_id, &steam_id).await? {
            return Err(LibraryError::AccountNotFound(account_id));
        }
        info!(account_id, steam_id = %steam_id, "steam identity linked");
        Ok(steam_id)
    }

    /// Turns the request into a SteamID64 without touching the account.
    /// A profile URL takes precedence over a raw id.
    pub async fn resolve(&self, request: &LinkRequest) -> LibraryResult<SteamId> {
        let profile_url = non_blank(request.profile_url.as_deref());
        let raw_id = non_blank(request.steam_id64.as_deref());

        match (profile_url, raw_id) {
            (Some(url), _) => match ProfileRef::parse(url)? {
                ProfileRef::Numeric(id) => SteamId::parse(&id),
                ProfileRef::Vanity(name) => self.resolve_vanity(&name).await,
            },
            (None, Some(raw)) => SteamId::parse(raw),
            (None, None) => Err(LibraryError::MissingInput),
        }
    }

    async fn resolve_vanity(&self, name: &str) -> LibraryResult<SteamId> {
        match self.steam.resolve_vanity(name).await {
            Ok(Some(id)) => SteamId::parse(&id).map_err(|_| {
                LibraryError::ResolutionFailed(format!("Steam returned an invalid id for {name:?}"))
            }),
            Ok(None) => Err(LibraryError::ResolutionFailed(format!(
                "no Steam profile named {name:?}"
            ))),
            Err(err) => {
                warn!(vanity = name, error = %err, "vanity resolution failed");
                Err(LibraryError::ResolutionFailed(err.to_string()))
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::testing::{FakeSteam, MemoryStore};

    fn request(profile_url: Option<&str>, steam_id64: Option<&str>) -> LinkRequest {
        LinkRequest {
            profile_url: profile_url.map(str::to_string),
            steam_id64: steam_id64.map(str::to_string),
        }
    }

    fn linker() -> (IdentityLinker, Arc<FakeSteam>, Arc<MemoryStore>, i64) {
        let steam = Arc::new(FakeSteam::default());
        steam
            .vanity
            .lock()
            .unwrap()
            .insert("gabelogannewell".into(), "76561197960287930".into());
        let (store, account_id) = MemoryStore::with_account(None);
        let store = Arc::new(store);
        (
            IdentityLinker::new(steam.clone(), store.clone()),
            steam,
            store,
            account_id,
        )
    }

    #[test]
    fn recognizes_profile_url_shapes() {
        assert_eq!(
            ProfileRef::parse("https://steamcommunity.com/id/gabe/").unwrap(),
            ProfileRef::Vanity("gabe".into())
        );
        assert_eq!(
            ProfileRef::parse("steamcommunity.com/profiles/76561198000000000/games?tab=all")
                .unwrap(),
            ProfileRef::Numeric("76561198000000000".into())
        );
        for bad in [
            "https://example.com/id/gabe",
            "https://steamcommunity.com/groups/valve",
            "https://steamcommunity.com/id/",
            "not a url at all",
        ] {
            assert!(
                matches!(ProfileRef::parse(bad), Err(LibraryError::InvalidProfileUrl(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn numeric_profile_url_links_without_upstream_call() {
        let (linker, steam, store, account_id) = linker();
        let id = linker
            .link_identity(
                account_id,
                &request(
                    Some("https://steamcommunity.com/profiles/76561198000000000"),
                    None,
                ),
            )
            .await
            .unwrap();

        assert_eq!(id.as_str(), "76561198000000000");
        assert_eq!(steam.calls(), (0, 0, 0));
        assert_eq!(
            store.steam_id_of(account_id).as_deref(),
            Some("76561198000000000")
        );
    }

    #[tokio::test]
    async fn vanity_url_is_resolved_upstream() {
        let (linker, steam, store, account_id) = linker();
        let id = linker
            .link_identity(
                account_id,
                &request(Some("https://steamcommunity.com/id/gabelogannewell"), None),
            )
            .await
            .unwrap();

        assert_eq!(id.as_str(), "76561197960287930");
        assert_eq!(steam.calls().2, 1);
        assert_eq!(
            store.steam_id_of(account_id).as_deref(),
            Some("76561197960287930")
        );
    }

    #[tokio::test]
    async fn unknown_vanity_name_fails_resolution() {
        let (linker, _, store, account_id) = linker();
        let err = linker
            .link_identity(
                account_id,
                &request(Some("https://steamcommunity.com/id/nobody"), None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LibraryError::ResolutionFailed(_)));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn raw_handle_rules() {
        let (linker, _, store, account_id) = linker();

        let ok = linker
            .link_identity(account_id, &request(None, Some(" 76561198000000000 ")))
            .await
            .unwrap();
        assert_eq!(ok.as_str(), "76561198000000000");

        for bad in ["1234", "7656119800000000a"] {
            let err = linker
                .link_identity(account_id, &request(Some("  "), Some(bad)))
                .await
                .unwrap_err();
            assert!(matches!(err, LibraryError::InvalidHandleFormat(_)));
        }
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn empty_input_is_an_error() {
        let (linker, _, store, account_id) = linker();
        let err = linker
            .link_identity(account_id, &request(Some(""), Some("   ")))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::MissingInput));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn profile_url_wins_over_raw_handle() {
        let (linker, _, _, account_id) = linker();
        let id = linker
            .link_identity(
                account_id,
                &request(
                    Some("steamcommunity.com/profiles/76561198000000001"),
                    Some("76561198000000002"),
                ),
            )
            .await
            .unwrap();
        assert_eq!(id.as_str(), "76561198000000001");
    }

    #[tokio::test]
    async fn missing_account_is_reported_after_validation() {
        let (linker, _, _, _) = linker();
        let err = linker
            .link_identity(42, &request(None, Some("76561198000000000")))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::AccountNotFound(42)));
    }
}
