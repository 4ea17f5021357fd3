#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tinylink_gateway::application::services::{
    AuthService, LinkService, RedirectResolver, StatsService,
};
use tinylink_gateway::domain::click_event::ClickEvent;
use tinylink_gateway::domain::entities::{LinkPatch, NewClick, NewLink, ShortLink};
use tinylink_gateway::domain::repositories::{ClickRepository, LinkRepository, ListFilter};
use tinylink_gateway::error::AppError;
use tinylink_gateway::infrastructure::cache::{CacheService, NullCache};
use tinylink_gateway::infrastructure::persistence::MemoryStore;
use tinylink_gateway::state::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Builds an `AppState` over the given repositories.
///
/// Returns the receiving end of the click channel so tests can observe what
/// the redirect handler enqueued.
pub fn state_over(
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let cache: Arc<dyn CacheService> = Arc::new(NullCache::new());
    let (tx, rx) = mpsc::channel(queue_capacity);

    let state = AppState {
        resolver: Arc::new(RedirectResolver::new(links.clone(), cache.clone())),
        link_service: Arc::new(LinkService::new(links.clone(), cache.clone())),
        stats_service: Arc::new(StatsService::new(links.clone(), clicks)),
        auth_service: Arc::new(AuthService::new(ADMIN_TOKEN)),
        links,
        cache,
        click_sender: tx,
        fallback_redirect_url: None,
        behind_proxy: false,
    };

    (state, rx)
}

/// Builds an `AppState` over a fresh in-memory store.
///
/// The store is returned too, for seeding and direct inspection.
pub fn create_test_state() -> (AppState, mpsc::Receiver<ClickEvent>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let (state, rx) = state_over(store.clone(), store.clone(), 100);
    (state, rx, store)
}

pub async fn seed_link(store: &MemoryStore, code: &str, url: &str, owner: &str) -> ShortLink {
    store
        .create(NewLink {
            code: code.to_string(),
            destination: url.to_string(),
            owner: owner.to_string(),
            expires_at: None,
        })
        .await
        .unwrap()
}

pub async fn seed_expired_link(
    store: &MemoryStore,
    code: &str,
    url: &str,
    owner: &str,
) -> ShortLink {
    store
        .create(NewLink {
            code: code.to_string(),
            destination: url.to_string(),
            owner: owner.to_string(),
            expires_at: Some(Utc::now() - Duration::hours(1)),
        })
        .await
        .unwrap()
}

pub async fn seed_deleted_link(
    store: &MemoryStore,
    code: &str,
    url: &str,
    owner: &str,
) -> ShortLink {
    seed_link(store, code, url, owner).await;
    store.soft_delete(code).await.unwrap();
    store.find_by_code(code).await.unwrap().unwrap()
}

pub async fn seed_click(store: &MemoryStore, link_id: i64, ip: &str) {
    store
        .insert_clicks(vec![NewClick {
            link_id,
            occurred_at: Utc::now(),
            ip: Some(ip.to_string()),
            user_agent: Some("TestBot/1.0".to_string()),
            referer: None,
            country: None,
        }])
        .await
        .unwrap();
}

/// A link store that always fails, as if the database were down.
pub struct FailingStore;

fn down() -> AppError {
    AppError::unavailable("Storage unavailable", serde_json::json!({}))
}

#[async_trait::async_trait]
impl LinkRepository for FailingStore {
    async fn create(&self, _new_link: NewLink) -> Result<ShortLink, AppError> {
        Err(down())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortLink>, AppError> {
        Err(down())
    }

    async fn find_active_by_destination(
        &self,
        _destination: &str,
        _owner: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        Err(down())
    }

    async fn list(&self, _filter: ListFilter) -> Result<Vec<ShortLink>, AppError> {
        Err(down())
    }

    async fn count(&self, _owner: Option<String>) -> Result<i64, AppError> {
        Err(down())
    }

    async fn update(&self, _code: &str, _patch: LinkPatch) -> Result<ShortLink, AppError> {
        Err(down())
    }

    async fn soft_delete(&self, _code: &str) -> Result<bool, AppError> {
        Err(down())
    }

    async fn purge_expired_before(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(down())
    }
}
