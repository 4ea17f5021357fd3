//! Shared application state injected into handlers.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, RedirectResolver, StatsService};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Application state shared across all request handlers.
///
/// Cloned per request by axum; every field is either a cheap handle or
/// immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RedirectResolver>,
    pub link_service: Arc<LinkService>,
    pub stats_service: Arc<StatsService>,
    pub auth_service: Arc<AuthService>,

    /// Direct store handle for the health probe.
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,

    pub click_sender: mpsc::Sender<ClickEvent>,

    /// Where `GET /` sends visitors; `None` serves the 404 page instead.
    pub fallback_redirect_url: Option<String>,

    /// Trust forwarded headers for client IPs.
    pub behind_proxy: bool,
}
