// Bearer-secret middleware for the API scope and the per-request account context.

use crate::api::models::ApiResponse;
use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::HeaderMap, StatusCode},
    Error, FromRequest, HttpRequest, HttpResponse, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

pub const ACCOUNT_HEADER: &str = "X-Account-Id";

/// Authentication middleware that validates Bearer tokens
pub struct Auth {
    secret: String,
}

impl Auth {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Auth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct AuthMiddleware<S> {
    service: S,
    secret: String,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip auth for health check
        let public = req.path() == "/health" || req.path() == "/";

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        if public || token == Some(self.secret.as_str()) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        }

        // Invalid or missing token
        Box::pin(async move {
            let response = HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error(
                    "Invalid or missing authentication token",
                ))
                .map_into_right_body();
            Ok(req.into_response(response))
        })
    }
}

/// Who a request acts for. Extracted per request from `X-Account-Id`; session
/// handling lives in front of this service.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub account_id: i64,
    pub request_id: String,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ContextError> {
        let raw = headers
            .get(ACCOUNT_HEADER)
            .ok_or(ContextError::MissingAccount)?
            .to_str()
            .map_err(|_| ContextError::InvalidAccount)?;
        let account_id = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(ContextError::InvalidAccount)?;
        Ok(Self {
            account_id,
            request_id: uuid::Uuid::new_v4().to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("missing X-Account-Id header")]
    MissingAccount,
    #[error("X-Account-Id must be a positive integer")]
    InvalidAccount,
}

impl ResponseError for ContextError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.to_string()))
    }
}

impl FromRequest for RequestContext {
    type Error = ContextError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req.headers()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn context_requires_a_positive_account_id() {
        let req = TestRequest::default()
            .insert_header((ACCOUNT_HEADER, " 42 "))
            .to_http_request();
        let ctx = RequestContext::from_headers(req.headers()).unwrap();
        assert_eq!(ctx.account_id, 42);
        assert!(!ctx.request_id.is_empty());

        let missing = TestRequest::default().to_http_request();
        assert!(matches!(
            RequestContext::from_headers(missing.headers()),
            Err(ContextError::MissingAccount)
        ));

        for bad in ["abc", "0", "-3"] {
            let req = TestRequest::default()
                .insert_header((ACCOUNT_HEADER, bad))
                .to_http_request();
            assert!(matches!(
                RequestContext::from_headers(req.headers()),
                Err(ContextError::InvalidAccount)
            ));
        }
    }
}
