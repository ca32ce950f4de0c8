// HTTP request handlers for API endpoints

use crate::api::auth::RequestContext;
use crate::api::models::*;
use crate::error::LibraryError;
use crate::library::{Library, LinkRequest, ListQuery};
use crate::util::db::Db;
use actix_web::{web, HttpResponse, Result};
use std::time::Instant;

/// Process start, for the uptime reported by the health check.
pub struct StartedAt(pub Instant);

/// Health check endpoint
pub async fn health_check(db: web::Data<Db>, started: web::Data<StartedAt>) -> HttpResponse {
    let db_status = if db.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    HttpResponse::Ok().json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: started.0.elapsed().as_secs(),
    }))
}

pub async fn create_account(
    library: web::Data<Library>,
    payload: web::Json<CreateAccountRequest>,
) -> Result<HttpResponse, LibraryError> {
    let account = library.create_account(&payload.email).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(account)))
}

pub async fn current_account(
    ctx: RequestContext,
    library: web::Data<Library>,
) -> Result<HttpResponse, LibraryError> {
    let account = library.account(ctx.account_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(account)))
}

/// Link a Steam identity from a profile URL or a raw SteamID64.
pub async fn link_steam(
    ctx: RequestContext,
    library: web::Data<Library>,
    payload: web::Json<LinkRequest>,
) -> Result<HttpResponse, LibraryError> {
    tracing::info!(
        account_id = ctx.account_id,
        request_id = %ctx.request_id,
        has_profile_url = payload.profile_url.is_some(),
        "steam link requested"
    );
    let steam_id = library
        .linker
        .link_identity(ctx.account_id, &payload)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(LinkedIdentity {
        steam_id: steam_id.into_inner(),
    })))
}

/// Sync from Steam and return every synced title.
pub async fn sync_games(
    ctx: RequestContext,
    library: web::Data<Library>,
) -> Result<HttpResponse, LibraryError> {
    tracing::info!(account_id = ctx.account_id, request_id = %ctx.request_id, "sync requested");
    let items = library.synchronizer.sync(ctx.account_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// Sync (unless `refresh=false`) and return one sorted, filtered page.
pub async fn list_games(
    ctx: RequestContext,
    library: web::Data<Library>,
    params: web::Query<GamesQuery>,
) -> Result<HttpResponse, LibraryError> {
    let params = params.into_inner();
    let query = ListQuery::new(
        library.config().query,
        params.page,
        params.per_page,
        params.sort.as_deref(),
        params.order.as_deref(),
        params.tag.as_deref(),
    );

    let synced = params.refresh.unwrap_or(true);
    if synced {
        library.synchronizer.sync(ctx.account_id).await?;
    }
    let page = library.query.list(ctx.account_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(GamesPage {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
        sort: query.sort,
        order: query.order,
        tag: query.tag,
        synced,
    })))
}

pub async fn update_status(
    ctx: RequestContext,
    library: web::Data<Library>,
    path: web::Path<i64>,
    payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, LibraryError> {
    let appid = path.into_inner();
    let item = library
        .update_status(ctx.account_id, appid, &payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

pub async fn set_tags(
    ctx: RequestContext,
    library: web::Data<Library>,
    path: web::Path<i64>,
    payload: web::Json<TagsUpdate>,
) -> Result<HttpResponse, LibraryError> {
    let appid = path.into_inner();
    let item = library
        .set_tags(ctx.account_id, appid, &payload.tags)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}
