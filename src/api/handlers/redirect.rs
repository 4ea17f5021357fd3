//! Handlers for the visitor-facing redirect surface.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::{error, warn};

use crate::application::services::Resolution;
use crate::domain::click_event::ClickEvent;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Fallback page for unknown or deleted codes.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
struct NotFoundPage {}

/// Fallback page for expired codes.
#[derive(Template, WebTemplate)]
#[template(path = "gone.html")]
struct GonePage {}

/// Transient-error page shown while storage is unreachable.
#[derive(Template, WebTemplate)]
#[template(path = "unavailable.html")]
struct UnavailablePage {}

/// Negative outcomes are cacheable briefly; a just-created link becomes
/// reachable within a minute without a purge.
const NEGATIVE_CACHE_CONTROL: &str = "public, max-age=60";

/// Renders the 404 fallback page.
pub fn not_found_page() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CACHE_CONTROL, NEGATIVE_CACHE_CONTROL)],
        NotFoundPage {},
    )
        .into_response()
}

fn gone_page() -> Response {
    (
        StatusCode::GONE,
        [(header::CACHE_CONTROL, NEGATIVE_CACHE_CONTROL)],
        GonePage {},
    )
        .into_response()
}

fn unavailable_page() -> Response {
    // Transient by definition; intermediaries must not hold on to it
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CACHE_CONTROL, "no-store")],
        UnavailablePage {},
    )
        .into_response()
}

/// `302 Found` to the destination.
///
/// Deliberately not 301/308: permanent redirects get cached by browsers
/// and CDNs, which would keep serving a destination after the link is
/// edited, expired, or deleted.
fn found_redirect(destination: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, destination)]).into_response()
}

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Outcomes
///
/// - Live link → `302 Found` with `Location`
/// - Unknown or deleted code → `404` fallback page
/// - Expired code → `410` fallback page
/// - Storage unreachable → `503` transient page
///
/// # Click Tracking
///
/// On a successful resolution a [`ClickEvent`] goes onto a bounded channel
/// with `try_send`. A full or closed queue drops the event with a warning;
/// the redirect response never waits for, or fails with, the click pipeline.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let resolution = match state.resolver.resolve(&code).await {
        Ok(resolution) => resolution,
        Err(e) => {
            error!("Resolution failed for {}: {}", code, e);
            return unavailable_page();
        }
    };

    match resolution {
        Resolution::Redirect {
            link_id,
            destination,
        } => {
            let ip = client_ip(&headers, addr.ip(), state.behind_proxy);
            let click_event = ClickEvent::new(
                link_id,
                code,
                Some(ip.to_string()),
                headers
                    .get(header::USER_AGENT)
                    .and_then(|v| v.to_str().ok()),
                headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
            );

            if let Err(e) = state.click_sender.try_send(click_event) {
                warn!("Click event dropped: {}", e);
                metrics::counter!("clicks_dropped_total", "stage" => "queue").increment(1);
            }

            found_redirect(&destination)
        }
        Resolution::NotFound => not_found_page(),
        Resolution::Gone => gone_page(),
    }
}

/// Handles requests to the bare root.
///
/// # Endpoint
///
/// `GET /`
///
/// Redirects to the configured fallback URL (typically the marketing
/// site); without one, serves the 404 fallback page.
pub async fn root_handler(State(state): State<AppState>) -> Response {
    match &state.fallback_redirect_url {
        Some(url) => found_redirect(url),
        None => not_found_page(),
    }
}
