// API route configuration

use crate::api::handlers;
use crate::api::models::ApiResponse;
use actix_web::{error, web, HttpRequest, HttpResponse};

// Malformed query strings get the same JSON envelope as every other error.
fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error(err.to_string()));
    error::InternalError::from_response(err, response).into()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check (no auth required)
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        // API v1 routes (all require authentication)
        .service(
            web::scope("/api/v1")
                .app_data(web::QueryConfig::default().error_handler(query_error))
                .route("/accounts", web::post().to(handlers::create_account))
                // Acting account comes from X-Account-Id
                .route("/me", web::get().to(handlers::current_account))
                .route("/me/steam", web::put().to(handlers::link_steam))
                // Library
                .route("/games/sync", web::post().to(handlers::sync_games))
                .route("/games", web::get().to(handlers::list_games))
                .route(
                    "/games/{appid}/status",
                    web::put().to(handlers::update_status),
                )
                .route("/games/{appid}/tags", web::put().to(handlers::set_tags)),
        );
}
