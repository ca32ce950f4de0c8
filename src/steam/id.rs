use crate::error::{LibraryError, LibraryResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest accepted SteamID64. Real ids are 17 digits (`7656119…`).
pub const MIN_STEAM_ID_LEN: usize = 17;

/// A validated SteamID64.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(String);

impl SteamId {
    /// Accepts all-ASCII-digit input of at least [`MIN_STEAM_ID_LEN`] characters.
    pub fn parse(raw: &str) -> LibraryResult<Self> {
        let raw = raw.trim();
        if raw.len() >= MIN_STEAM_ID_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(LibraryError::InvalidHandleFormat(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
