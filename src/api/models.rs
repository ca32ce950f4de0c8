// API request/response models (DTOs)

use crate::library::query::{SortDir, SortKey};
use crate::library::OwnedItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Some(Meta::now()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            meta: Some(Meta::now()),
        }
    }
}

/// Metadata included in all API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkedIdentity {
    pub steam_id: String,
}

/// Query string for `GET /games`. Everything is optional. Unknown `sort` and
/// `order` values fall back to name/asc; a non-numeric `page`/`per_page` or a
/// non-boolean `refresh` is rejected with 400.
#[derive(Debug, Default, Deserialize)]
pub struct GamesQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub tag: Option<String>,
    /// Set to `false` to read the stored library without syncing first.
    pub refresh: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GamesPage {
    pub items: Vec<OwnedItem>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
    pub sort: SortKey,
    pub order: SortDir,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub synced: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TagsUpdate {
    #[serde(default)]
    pub tags: Vec<String>,
}
