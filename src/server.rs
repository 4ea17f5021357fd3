//! HTTP server initialization and runtime setup.
//!
//! Wires the storage backend, cache, background tasks, and the Axum server
//! lifecycle, including graceful shutdown with click-queue draining.

use crate::config::{Config, StorageBackend};
use crate::domain::click_worker::run_click_worker;
use crate::domain::expiry_sweep::{SweepSettings, run_expiry_sweep};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geoip;
use crate::infrastructure::persistence::{MemoryStore, PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::application::services::{AuthService, LinkService, RedirectResolver, StatsService};

/// How long shutdown waits for background tasks to finish.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The link store (PostgreSQL pool with migrations, or the in-memory store)
/// - Redis cache (or NullCache fallback)
/// - GeoIP resolver for click enrichment
/// - Background click worker and expiry sweeper
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (links, clicks): (Arc<dyn LinkRepository>, Arc<dyn ClickRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("postgres backend selected without a database URL")?;
                let pool = connect_postgres(&config, url).await?;
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;

                let pool = Arc::new(pool);
                (
                    Arc::new(PgLinkRepository::new(pool.clone())),
                    Arc::new(PgClickRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory store; links will not survive a restart");
                let store = Arc::new(MemoryStore::new());
                let links: Arc<dyn LinkRepository> = store.clone();
                let clicks: Arc<dyn ClickRepository> = store;
                (links, clicks)
            }
        };

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let geo = geoip::from_path(config.maxmind_db_path.as_deref());

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(click_rx, clicks.clone(), geo));
    tracing::info!("Click worker started");

    let (sweep_tx, sweep_rx) = watch::channel(());
    let sweeper = tokio::spawn(run_expiry_sweep(
        links.clone(),
        cache.clone(),
        SweepSettings {
            interval: Duration::from_secs(config.sweep_interval_seconds),
            retention: chrono::Duration::days(config.expired_retention_days),
        },
        sweep_rx,
    ));
    tracing::info!("Expiry sweeper started");

    let auth_service = Arc::new(AuthService::new(&config.admin_token));
    tracing::info!("Admin token fingerprint: {}", auth_service.fingerprint());

    let state = AppState {
        resolver: Arc::new(RedirectResolver::new(links.clone(), cache.clone())),
        link_service: Arc::new(LinkService::new(links.clone(), cache.clone())),
        stats_service: Arc::new(StatsService::new(links.clone(), clicks)),
        auth_service,
        links,
        cache,
        click_sender: click_tx.clone(),
        fallback_redirect_url: config.fallback_redirect_url.clone(),
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The server and its state clones are gone; dropping the last sender
    // closes the click channel so the worker drains and exits.
    drop(click_tx);
    let _ = sweep_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, worker).await {
        Ok(_) => tracing::info!("Click worker drained"),
        Err(_) => tracing::warn!("Click worker did not drain within {DRAIN_TIMEOUT:?}"),
    }
    match tokio::time::timeout(DRAIN_TIMEOUT, sweeper).await {
        Ok(_) => {}
        Err(_) => tracing::warn!("Expiry sweeper did not stop within {DRAIN_TIMEOUT:?}"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Connects to PostgreSQL with exponential backoff.
///
/// The database often comes up alongside the service; retrying briefly
/// covers that window without hiding a genuinely bad configuration.
async fn connect_postgres(config: &Config, url: &str) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(500).map(jitter).take(5);

    let pool = Retry::spawn(strategy, || {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime))
            .connect(url)
    })
    .await
    .context("Failed to connect to database")?;

    Ok(pool)
}

/// Completes when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
