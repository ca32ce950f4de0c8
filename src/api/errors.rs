// Maps library errors onto HTTP statuses and the JSON envelope.

use crate::api::models::ApiResponse;
use crate::error::LibraryError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

impl ResponseError for LibraryError {
    fn status_code(&self) -> StatusCode {
        match self {
            LibraryError::AccountNotFound(_) | LibraryError::GameNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            LibraryError::EmailTaken(_) | LibraryError::IdentityNotLinked { .. } => {
                StatusCode::CONFLICT
            }
            LibraryError::InvalidEmail(_)
            | LibraryError::InvalidHandleFormat(_)
            | LibraryError::InvalidProfileUrl(_)
            | LibraryError::MissingInput
            | LibraryError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            LibraryError::ResolutionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LibraryError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LibraryError::UpstreamStatus { .. }
            | LibraryError::MalformedUpstreamResponse { .. }
            | LibraryError::Http(_) => StatusCode::BAD_GATEWAY,
            LibraryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() && matches!(self, LibraryError::Database(_)) {
            tracing::error!(error = %self, "database failure");
            "internal database error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ApiResponse::<()>::error(message))
    }
}
