pub mod client;
pub mod id;
mod models;

pub use client::{AchievementTally, OwnedGame, SteamApi, SteamWebClient};
pub use id::SteamId;
