//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`            - Fallback redirect to the marketing site (public)
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: store, cache, click queue (public)
//! - `/api/*`            - REST management API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on the management API
//! - **Authentication** - Bearer token on the management API
//! - **Path normalization** - Trailing slash handling
//!
//! The redirect route carries no rate limiter; it is the public surface
//! and burst traffic from a shared link is its normal operating mode.

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, root_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Client-IP handling (rate-limit keys, recorded click IPs) honors
/// forwarded headers only when `state.behind_proxy` is set; enable that
/// only behind a trusted reverse proxy.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer(state.behind_proxy));

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
