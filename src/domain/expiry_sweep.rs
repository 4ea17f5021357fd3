//! Background task that hard-deletes stale links.
//!
//! Links stay in storage for a retention window after expiring or being
//! soft-deleted, so redirects keep answering 410 (or 404) with full
//! knowledge of the code. Once the window passes, this task removes the
//! rows and drops their cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Sweep cadence and how long stale rows are retained.
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    pub interval: Duration,
    pub retention: chrono::Duration,
}

/// Runs the sweep loop until the shutdown sender signals or drops.
pub async fn run_expiry_sweep(
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    settings: SweepSettings,
    mut shutdown: watch::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // The first tick fires immediately, clearing any backlog
            // accumulated while the process was down.
            _ = ticker.tick() => {
                sweep_once(links.as_ref(), cache.as_ref(), settings.retention).await;
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Expiry sweeper stopped");
}

/// Performs a single sweep pass.
pub async fn sweep_once(
    links: &dyn LinkRepository,
    cache: &dyn CacheService,
    retention: chrono::Duration,
) {
    let cutoff = Utc::now() - retention;

    match links.purge_expired_before(cutoff).await {
        Ok(codes) if codes.is_empty() => {
            debug!("Expiry sweep found nothing to purge");
        }
        Ok(codes) => {
            info!("Purged {} stale links", codes.len());
            metrics::counter!("links_purged_total").increment(codes.len() as u64);

            for code in &codes {
                if let Err(e) = cache.invalidate(code).await {
                    warn!("Failed to invalidate cache for purged {}: {}", code, e);
                }
            }
        }
        Err(e) => {
            // Next pass retries; rows never purge twice
            warn!("Expiry sweep failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewLink;
    use crate::infrastructure::cache::{MockCacheService, NullCache};
    use crate::infrastructure::persistence::MemoryStore;

    #[tokio::test]
    async fn test_sweep_once_purges_and_invalidates() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(NewLink {
                code: "stale-link".to_string(),
                destination: "https://example.com/".to_string(),
                owner: "user_1".to_string(),
                expires_at: Some(Utc::now() - chrono::Duration::days(60)),
            })
            .await
            .unwrap();
        store
            .create(NewLink {
                code: "live-link".to_string(),
                destination: "https://example.org/".to_string(),
                owner: "user_1".to_string(),
                expires_at: None,
            })
            .await
            .unwrap();

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate()
            .withf(|code| code == "stale-link")
            .times(1)
            .returning(|_| Ok(()));

        sweep_once(store.as_ref(), &cache, chrono::Duration::days(30)).await;

        assert!(store.find_by_code("stale-link").await.unwrap().is_none());
        assert!(store.find_by_code("live-link").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_loop_stops_on_shutdown() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let (tx, rx) = watch::channel(());

        let sweeper = tokio::spawn(run_expiry_sweep(
            store,
            Arc::new(NullCache),
            SweepSettings {
                interval: Duration::from_secs(3600),
                retention: chrono::Duration::days(30),
            },
            rx,
        ));

        drop(tx);
        sweeper.await.unwrap();
    }
}
