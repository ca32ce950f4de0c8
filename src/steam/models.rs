// Wire types for the Steam Web API endpoints used by the library sync.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct OwnedGamesEnvelope {
    pub response: OwnedGamesResponse,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwnedGamesResponse {
    #[allow(dead_code)]
    #[serde(default)]
    pub game_count: Option<u64>,
    // Private profiles answer with an empty `response` object.
    #[serde(default)]
    pub games: Vec<OwnedGameEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnedGameEntry {
    pub appid: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub playtime_forever: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AchievementsEnvelope {
    pub playerstats: PlayerStats,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayerStats {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub achievements: Option<Vec<AchievementEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AchievementEntry {
    #[serde(default)]
    pub achieved: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveVanityEnvelope {
    pub response: ResolveVanityResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveVanityResponse {
    pub success: i64,
    #[serde(default)]
    pub steamid: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
