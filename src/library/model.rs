use crate::error::{LibraryError, LibraryResult};
use crate::steam::SteamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status assigned to titles the first time they are synced.
pub const DEFAULT_STATUS: &str = "Backlog";
pub const MAX_STATUS_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub steam_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The linked handle, or `IdentityNotLinked`.
    pub fn linked_steam_id(&self) -> LibraryResult<SteamId> {
        match self.steam_id.as_deref() {
            Some(raw) if !raw.trim().is_empty() => SteamId::parse(raw),
            _ => Err(LibraryError::IdentityNotLinked {
                account_id: self.id,
            }),
        }
    }
}

/// One row of an account's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OwnedItem {
    pub appid: i64,
    pub name: String,
    pub playtime_minutes: i64,
    pub status: String,
    pub completion: f64,
    pub tags: Vec<String>,
}

/// Upstream-derived fields for one title, ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedItem {
    pub appid: i64,
    pub name: String,
    pub playtime_minutes: i64,
    pub completion: f64,
}

pub fn normalize_status(raw: &str) -> LibraryResult<String> {
    let status = raw.trim();
    if status.is_empty() || status.chars().count() > MAX_STATUS_LEN {
        return Err(LibraryError::InvalidStatus(raw.to_string()));
    }
    Ok(status.to_string())
}

/// Trims, drops empties, and removes duplicates keeping the first occurrence.
pub fn normalize_tags<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

pub fn normalize_email(raw: &str) -> LibraryResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(LibraryError::InvalidEmail(raw.to_string())),
    }
}
