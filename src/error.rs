use thiserror::Error;

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Every failure the library, identity and sync paths can surface.
///
/// `MalformedUpstreamResponse` and `UpstreamStatus` are also produced per item
/// during achievement enrichment, where the synchronizer absorbs them instead of
/// returning them.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("account {0} not found")]
    AccountNotFound(i64),

    #[error("game {appid} not found in library of account {account_id}")]
    GameNotFound { account_id: i64, appid: i64 },

    #[error("email {0} is already registered")]
    EmailTaken(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("account {account_id} has no linked Steam identity")]
    IdentityNotLinked { account_id: i64 },

    #[error("Steam is unavailable after {attempts} attempt(s): {last_error}")]
    UpstreamUnavailable { attempts: u32, last_error: String },

    #[error("{endpoint} returned HTTP {status}")]
    UpstreamStatus { endpoint: &'static str, status: u16 },

    #[error("malformed response from {endpoint}: {detail}")]
    MalformedUpstreamResponse {
        endpoint: &'static str,
        detail: String,
    },

    #[error("could not resolve Steam profile: {0}")]
    ResolutionFailed(String),

    #[error("invalid SteamID64 {0:?}: expected at least 17 digits")]
    InvalidHandleFormat(String),

    #[error("unrecognized Steam profile URL: {0}")]
    InvalidProfileUrl(String),

    #[error("either a Steam profile URL or a SteamID64 is required")]
    MissingInput,

    #[error("invalid status {0:?}")]
    InvalidStatus(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LibraryError {
    pub(crate) fn malformed(endpoint: &'static str, detail: impl ToString) -> Self {
        LibraryError::MalformedUpstreamResponse {
            endpoint,
            detail: detail.to_string(),
        }
    }
}
