//! Handler for per-link click statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Retrieves click statistics for a specific short link.
///
/// # Endpoint
///
/// `GET /api/links/{code}/stats`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, max: 1000)
///
/// # Response
///
/// Returns link metadata, the denormalized click total, the recorded
/// detail-row count, and a paginated window of recent clicks (newest
/// first). Available for deleted and expired links too.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<StatsResponse>, AppError> {
    let (offset, limit) = params
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let report = state.stats_service.get_stats(&code, offset, limit).await?;

    let pagination = PaginationMeta::new(&params, report.recorded);

    Ok(Json(StatsResponse::from_report(report, pagination)))
}
