//! Handlers for link management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, LinkListResponse, LinkResponse, ListLinksParams, OwnerParams,
    UpdateLinkRequest,
};
use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::CreateLink;
use crate::domain::entities::LinkPatch;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/landing?utm_source=mail",
///   "owner": "user_42",
///   "custom_code": "spring-sale",          // optional
///   "expires_at": "2026-12-31T23:59:59Z"   // optional
/// }
/// ```
///
/// # Deduplication
///
/// Re-shortening the same normalized URL for the same owner (without a
/// custom code) returns the existing active link instead of minting a
/// new code.
///
/// # Errors
///
/// Returns 400 Bad Request on validation failure and 409 Conflict when a
/// custom code is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(CreateLink {
            url: payload.url,
            owner: payload.owner,
            custom_code: payload.custom_code,
            expires_at: payload.expires_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists links with pagination.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, max: 1000)
/// - `owner` (optional): Restrict to one owner
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListLinksParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (links, total) = state
        .link_service
        .list_links(params.owner, offset, limit)
        .await?;

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta::new(&params.pagination, total),
        items: links.into_iter().map(LinkResponse::from).collect(),
    }))
}

/// Fetches a single link, whatever its lifecycle state.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// Soft-deleted and expired links are returned too, with their `status`
/// field reflecting it.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;

    Ok(Json(link.into()))
}

/// Partially updates a short link.
///
/// # Endpoint
///
/// `PATCH /api/links/{code}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed; the code
/// itself is immutable.
///
/// ```json
/// {
///   "url": "https://new-destination.example.com",
///   "expires_at": "2026-12-31T23:59:59Z",  // null to clear
///   "owner": "user_42",                     // ownership check
///   "restore": true                         // clears deleted_at
/// }
/// ```
///
/// # Cache
///
/// The cache entry for this link is invalidated so the next redirect uses
/// the updated destination.
///
/// # Errors
///
/// Returns 404 Not Found for unknown codes, 403 Forbidden when the body
/// `owner` does not match the stored owner, and 400 Bad Request if
/// validation fails.
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let patch = LinkPatch {
        destination: payload.url,
        expires_at: payload.expires_at,
        restore: payload.restore,
    };

    let link = state
        .link_service
        .update_link(&code, patch, payload.owner)
        .await?;

    Ok(Json(link.into()))
}

/// Soft-deletes a short link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Behavior
///
/// - The row is kept with `deleted_at` set; redirects answer 404.
/// - Restorable via `PATCH /api/links/{code}` with `{"restore": true}`
///   until the retention sweep removes the row.
/// - An `owner` query parameter, when present, must match the stored owner.
///
/// # Cache
///
/// The cache entry is invalidated immediately so the next redirect
/// reflects the deletion without waiting for TTL expiry.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or is already deleted,
/// and 403 Forbidden on owner mismatch.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<OwnerParams>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&code, params.owner).await?;

    Ok(StatusCode::NO_CONTENT)
}
