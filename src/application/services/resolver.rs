//! Redirect resolution service.
//!
//! Decides what a visitor hitting `GET /{code}` gets: a redirect, a
//! not-found page, or a gone page. Storage trouble is the only error this
//! service surfaces; every other situation is a normal [`Resolution`].

use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedLink};

/// Outcome of resolving a short code.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Live link; redirect the visitor and record the click.
    Redirect { link_id: i64, destination: String },
    /// No such code, or the link was soft-deleted.
    NotFound,
    /// The link exists but its expiry has passed.
    Gone,
}

/// Resolves short codes through the cache with storage fallback.
///
/// # Cache discipline
///
/// - Hits are trusted for the destination but never for liveness: expiry is
///   re-checked on every hit because a cached entry can outlive its link.
/// - Misses fall through to storage; live links are written back to the
///   cache on a detached task so the visitor never waits for Redis.
/// - Cache errors degrade to storage lookups (fail-open).
pub struct RedirectResolver {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl RedirectResolver {
    /// Creates a new resolver.
    pub fn new(links: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { links, cache }
    }

    /// Resolves a short code to a [`Resolution`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] (or [`AppError::Internal`]) only
    /// when storage cannot answer; callers map that to the transient-error
    /// page.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        match self.cache.get_link(code).await {
            Ok(Some(cached)) => {
                if cached.is_expired() {
                    metrics::counter!("redirect_resolutions_total", "outcome" => "gone")
                        .increment(1);
                    return Ok(Resolution::Gone);
                }
                metrics::counter!("redirect_resolutions_total", "outcome" => "cache_hit")
                    .increment(1);
                return Ok(Resolution::Redirect {
                    link_id: cached.id,
                    destination: cached.destination,
                });
            }
            Ok(None) => {}
            Err(e) => {
                error!("Cache error for {}: {}", code, e);
            }
        }

        let Some(link) = self.links.find_by_code(code).await? else {
            metrics::counter!("redirect_resolutions_total", "outcome" => "not_found").increment(1);
            return Ok(Resolution::NotFound);
        };

        if link.is_deleted() {
            debug!("Code {} is soft-deleted", code);
            metrics::counter!("redirect_resolutions_total", "outcome" => "not_found").increment(1);
            return Ok(Resolution::NotFound);
        }

        if link.is_expired() {
            metrics::counter!("redirect_resolutions_total", "outcome" => "gone").increment(1);
            return Ok(Resolution::Gone);
        }

        // Write back asynchronously (fire-and-forget)
        let cache = Arc::clone(&self.cache);
        let entry = CachedLink {
            id: link.id,
            destination: link.destination.clone(),
            expires_at: link.expires_at,
        };
        let code_owned = code.to_string();
        tokio::spawn(async move {
            if let Err(e) = cache.set_link(&code_owned, &entry, None).await {
                error!("Failed to cache {}: {}", code_owned, e);
            }
        });

        metrics::counter!("redirect_resolutions_total", "outcome" => "store_hit").increment(1);
        Ok(Resolution::Redirect {
            link_id: link.id,
            destination: link.destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShortLink;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService, NullCache};
    use chrono::{Duration, Utc};

    fn live_link(id: i64, code: &str, destination: &str) -> ShortLink {
        ShortLink::new(
            id,
            code.to_string(),
            destination.to_string(),
            "user_1".to_string(),
            Utc::now(),
            None,
            0,
            None,
        )
    }

    #[tokio::test]
    async fn test_resolves_live_link_from_storage() {
        let mut links = MockLinkRepository::new();
        let link = live_link(7, "abc123", "https://example.com/");
        links
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(NullCache));

        let resolution = resolver.resolve("abc123").await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect {
                link_id: 7,
                destination: "https://example.com/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|_| Ok(None));

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(NullCache));

        assert_eq!(resolver.resolve("nope").await.unwrap(), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_soft_deleted_link_is_not_found() {
        let mut links = MockLinkRepository::new();
        let mut link = live_link(1, "dead", "https://example.com/");
        link.deleted_at = Some(Utc::now());
        links
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(NullCache));

        assert_eq!(resolver.resolve("dead").await.unwrap(), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_expired_link_is_gone() {
        let mut links = MockLinkRepository::new();
        let mut link = live_link(1, "expired", "https://example.com/");
        link.expires_at = Some(Utc::now() - Duration::seconds(5));
        links
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(NullCache));

        assert_eq!(resolver.resolve("expired").await.unwrap(), Resolution::Gone);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_storage() {
        let mut cache = MockCacheService::new();
        cache.expect_get_link().times(1).returning(|_| {
            Ok(Some(CachedLink {
                id: 3,
                destination: "https://cached.example.com/".to_string(),
                expires_at: None,
            }))
        });

        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(0);

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(cache));

        let resolution = resolver.resolve("cached").await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect {
                link_id: 3,
                destination: "https://cached.example.com/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_cache_hit_still_enforces_expiry() {
        let mut cache = MockCacheService::new();
        cache.expect_get_link().times(1).returning(|_| {
            Ok(Some(CachedLink {
                id: 3,
                destination: "https://cached.example.com/".to_string(),
                expires_at: Some(Utc::now() - Duration::seconds(1)),
            }))
        });

        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(0);

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(cache));

        assert_eq!(resolver.resolve("cached").await.unwrap(), Resolution::Gone);
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_storage() {
        let mut cache = MockCacheService::new();
        cache
            .expect_get_link()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("redis down".to_string())));
        // The detached write-back may or may not run before the test ends
        cache.expect_set_link().returning(|_, _, _| Ok(()));

        let mut links = MockLinkRepository::new();
        let link = live_link(9, "fallback", "https://example.com/");
        links
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(cache));

        let resolution = resolver.resolve("fallback").await.unwrap();
        assert!(matches!(resolution, Resolution::Redirect { link_id: 9, .. }));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|_| {
            Err(AppError::unavailable(
                "Storage temporarily unavailable",
                serde_json::json!({}),
            ))
        });

        let resolver = RedirectResolver::new(Arc::new(links), Arc::new(NullCache));

        let err = resolver.resolve("any").await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable { .. }));
    }
}
