use crate::config::SteamConfig;
use crate::error::{LibraryError, LibraryResult};
use crate::steam::id::SteamId;
use crate::steam::models::{AchievementsEnvelope, OwnedGamesEnvelope, ResolveVanityEnvelope};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

const OWNED_GAMES: &str = "GetOwnedGames";
const PLAYER_ACHIEVEMENTS: &str = "GetPlayerAchievements";
const RESOLVE_VANITY: &str = "ResolveVanityURL";

/// One title from the ownership listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedGame {
    pub appid: i64,
    pub name: String,
    pub playtime_minutes: i64,
}

/// Unlocked vs. total achievements for one title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementTally {
    pub unlocked: u32,
    pub total: u32,
}

impl AchievementTally {
    /// Percentage rounded to one decimal; 0 when the title has no achievements.
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = f64::from(self.unlocked) / f64::from(self.total) * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// The Steam Web API calls the library depends on. Each method performs a
/// single attempt; retry policy belongs to the caller.
#[async_trait]
pub trait SteamApi: Send + Sync {
    async fn owned_games(&self, steam_id: &SteamId) -> LibraryResult<Vec<OwnedGame>>;

    async fn achievement_tally(
        &self,
        steam_id: &SteamId,
        appid: i64,
    ) -> LibraryResult<AchievementTally>;

    /// `Ok(None)` when Steam reports no match for the vanity name.
    async fn resolve_vanity(&self, vanity: &str) -> LibraryResult<Option<String>>;
}

/// reqwest-backed [`SteamApi`].
pub struct SteamWebClient {
    client: Client,
    api_key: String,
    api_base: String,
    language: String,
}

impl SteamWebClient {
    pub fn new(config: &SteamConfig) -> LibraryResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            language: config.achievement_lang.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn get_text(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> LibraryResult<(u16, String)> {
        let resp = self
            .client
            .get(self.url(path))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(endpoint, status, bytes = body.len(), "steam response");
        Ok((status, body))
    }
}

#[async_trait]
impl SteamApi for SteamWebClient {
    #[instrument(skip(self), fields(steam_id = %steam_id))]
    async fn owned_games(&self, steam_id: &SteamId) -> LibraryResult<Vec<OwnedGame>> {
        let (status, body) = self
            .get_text(
                OWNED_GAMES,
                "IPlayerService/GetOwnedGames/v0001/",
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", steam_id.as_str()),
                    ("include_appinfo", "1"),
                    ("include_played_free_games", "1"),
                    ("format", "json"),
                    ("skip_unvetted_apps", "false"),
                ],
            )
            .await?;
        if !(200..300).contains(&status) {
            return Err(LibraryError::UpstreamStatus {
                endpoint: OWNED_GAMES,
                status,
            });
        }
        parse_owned_games(&body)
    }

    #[instrument(skip(self), fields(steam_id = %steam_id))]
    async fn achievement_tally(
        &self,
        steam_id: &SteamId,
        appid: i64,
    ) -> LibraryResult<AchievementTally> {
        let appid_str = appid.to_string();
        // Titles without stats answer 400 with a regular playerstats body, so the
        // status code is not checked here.
        let (_status, body) = self
            .get_text(
                PLAYER_ACHIEVEMENTS,
                "ISteamUserStats/GetPlayerAchievements/v1/",
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", steam_id.as_str()),
                    ("appid", appid_str.as_str()),
                    ("l", self.language.as_str()),
                ],
            )
            .await?;
        parse_achievement_tally(&body)
    }

    #[instrument(skip(self))]
    async fn resolve_vanity(&self, vanity: &str) -> LibraryResult<Option<String>> {
        let (status, body) = self
            .get_text(
                RESOLVE_VANITY,
                "ISteamUser/ResolveVanityURL/v1/",
                &[("key", self.api_key.as_str()), ("vanityurl", vanity)],
            )
            .await?;
        if !(200..300).contains(&status) {
            return Err(LibraryError::UpstreamStatus {
                endpoint: RESOLVE_VANITY,
                status,
            });
        }
        parse_vanity_resolution(&body)
    }
}

pub(crate) fn parse_owned_games(body: &str) -> LibraryResult<Vec<OwnedGame>> {
    let envelope: OwnedGamesEnvelope =
        serde_json::from_str(body).map_err(|e| LibraryError::malformed(OWNED_GAMES, e))?;
    Ok(envelope
        .response
        .games
        .into_iter()
        .map(|g| OwnedGame {
            appid: g.appid,
            name: g.name.unwrap_or_else(|| format!("App {}", g.appid)),
            playtime_minutes: g.playtime_forever.unwrap_or(0).max(0),
        })
        .collect())
}

pub(crate) fn parse_achievement_tally(body: &str) -> LibraryResult<AchievementTally> {
    let envelope: AchievementsEnvelope = serde_json::from_str(body)
        .map_err(|e| LibraryError::malformed(PLAYER_ACHIEVEMENTS, e))?;
    let stats = envelope.playerstats;
    if stats.success == Some(false) {
        return Ok(AchievementTally::default());
    }
    let Some(list) = stats.achievements else {
        return Ok(AchievementTally::default());
    };
    let unlocked = list.iter().filter(|a| a.achieved == 1).count();
    Ok(AchievementTally {
        unlocked: u32::try_from(unlocked).unwrap_or(u32::MAX),
        total: u32::try_from(list.len()).unwrap_or(u32::MAX),
    })
}

pub(crate) fn parse_vanity_resolution(body: &str) -> LibraryResult<Option<String>> {
    let envelope: ResolveVanityEnvelope =
        serde_json::from_str(body).map_err(|e| LibraryError::malformed(RESOLVE_VANITY, e))?;
    let response = envelope.response;
    if response.success != 1 {
        debug!(
            success = response.success,
            message = ?response.message,
            "vanity name not resolved"
        );
        return Ok(None);
    }
    match response.steamid {
        Some(id) => Ok(Some(id)),
        None => Err(LibraryError::malformed(RESOLVE_VANITY, "success without steamid")),
    }
}
