//! In-memory storage backend.
//!
//! Backs development and demo deployments that have no Postgres around, and
//! doubles as the storage used by handler integration tests. Semantics track
//! the PostgreSQL implementation: unique codes, soft deletes, in-place
//! counter increments under the write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{Click, LinkPatch, NewClick, NewLink, ShortLink};
use crate::domain::repositories::{ClickRepository, LinkRepository, ListFilter};
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    links: HashMap<String, ShortLink>,
    clicks: Vec<Click>,
    next_link_id: i64,
    next_click_id: i64,
}

/// Shared in-memory store implementing both repository traits.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_link_id: 1,
                next_click_id: 1,
                ..Inner::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<ShortLink, AppError> {
        let mut inner = self.inner.write().await;

        if inner.links.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "constraint": "links_code_key" }),
            ));
        }

        let id = inner.next_link_id;
        inner.next_link_id += 1;

        let link = ShortLink::new(
            id,
            new_link.code.clone(),
            new_link.destination,
            new_link.owner,
            Utc::now(),
            new_link.expires_at,
            0,
            None,
        );
        inner.links.insert(new_link.code, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.links.get(code).cloned())
    }

    async fn find_active_by_destination(
        &self,
        destination: &str,
        owner: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let inner = self.inner.read().await;

        Ok(inner
            .links
            .values()
            .filter(|l| {
                l.destination == destination
                    && l.owner == owner
                    && !l.is_deleted()
                    && !l.is_expired()
            })
            .max_by_key(|l| l.created_at)
            .cloned())
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<ShortLink>, AppError> {
        let inner = self.inner.read().await;

        let mut links: Vec<ShortLink> = inner
            .links
            .values()
            .filter(|l| !l.is_deleted())
            .filter(|l| filter.owner.as_deref().is_none_or(|o| l.owner == o))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(links
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, owner: Option<String>) -> Result<i64, AppError> {
        let inner = self.inner.read().await;

        Ok(inner
            .links
            .values()
            .filter(|l| !l.is_deleted())
            .filter(|l| owner.as_deref().is_none_or(|o| l.owner == o))
            .count() as i64)
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<ShortLink, AppError> {
        let mut inner = self.inner.write().await;

        let link = inner.links.get_mut(code).ok_or_else(|| {
            AppError::not_found("Short link not found", serde_json::json!({ "code": code }))
        })?;

        if let Some(destination) = patch.destination {
            link.destination = destination;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        if patch.restore {
            link.deleted_at = None;
        }

        Ok(link.clone())
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        match inner.links.get_mut(code) {
            Some(link) if !link.is_deleted() => {
                link.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let mut inner = self.inner.write().await;

        let purged: Vec<(i64, String)> = inner
            .links
            .values()
            .filter(|l| {
                l.expires_at.is_some_and(|e| e < cutoff)
                    || l.deleted_at.is_some_and(|d| d < cutoff)
            })
            .map(|l| (l.id, l.code.clone()))
            .collect();

        for (id, code) in &purged {
            inner.links.remove(code);
            // Click rows cascade with the link, like the FK does in Postgres
            inner.clicks.retain(|c| c.link_id != *id);
        }

        Ok(purged.into_iter().map(|(_, code)| code).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn insert_clicks(&self, clicks: Vec<NewClick>) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;

        for click in clicks {
            let id = inner.next_click_id;
            inner.next_click_id += 1;
            inner.clicks.push(Click {
                id,
                link_id: click.link_id,
                occurred_at: click.occurred_at,
                ip: click.ip,
                user_agent: click.user_agent,
                referer: click.referer,
                country: click.country,
            });
        }

        Ok(())
    }

    async fn bump_click_counts(&self, increments: Vec<(String, i64)>) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;

        for (code, delta) in increments {
            // Unknown codes are skipped, matching the SQL UPDATE join
            if let Some(link) = inner.links.get_mut(&code) {
                link.click_count += delta;
            }
        }

        Ok(())
    }

    async fn recent_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Click>, AppError> {
        let inner = self.inner.read().await;

        let mut clicks: Vec<Click> = inner
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        Ok(clicks
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_link(code: &str, destination: &str, owner: &str) -> NewLink {
        NewLink {
            code: code.to_string(),
            destination: destination.to_string(),
            owner: owner.to_string(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();

        let created = store
            .create(new_link("abc123", "https://example.com/", "user_1"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.click_count, 0);

        let found = store.find_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(found.destination, "https://example.com/");

        assert!(store.find_by_code("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_code_conflicts() {
        let store = MemoryStore::new();

        store
            .create(new_link("abc123", "https://example.com/", "user_1"))
            .await
            .unwrap();
        let err = store
            .create(new_link("abc123", "https://other.com/", "user_2"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_find_active_by_destination_skips_deleted_and_expired() {
        let store = MemoryStore::new();

        store
            .create(new_link("live-1", "https://example.com/", "user_1"))
            .await
            .unwrap();
        store
            .create(new_link("dead-1", "https://example.com/", "user_1"))
            .await
            .unwrap();
        store.soft_delete("dead-1").await.unwrap();

        let found = store
            .find_active_by_destination("https://example.com/", "user_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.code, "live-1");

        // Different owner sees nothing
        assert!(
            store
                .find_active_by_destination("https://example.com/", "user_2")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_filters_owner_and_paginates() {
        let store = MemoryStore::new();

        for i in 0..5 {
            store
                .create(new_link(
                    &format!("code-{i}"),
                    &format!("https://example.com/{i}"),
                    if i % 2 == 0 { "alice" } else { "bob" },
                ))
                .await
                .unwrap();
        }

        let all = store.list(ListFilter::new(0, 10)).await.unwrap();
        assert_eq!(all.len(), 5);

        let alices = store
            .list(ListFilter::new(0, 10).with_owner(Some("alice".to_string())))
            .await
            .unwrap();
        assert_eq!(alices.len(), 3);
        assert!(alices.iter().all(|l| l.owner == "alice"));

        let page = store.list(ListFilter::new(1, 2)).await.unwrap();
        assert_eq!(page.len(), 2);

        assert_eq!(store.count(None).await.unwrap(), 5);
        assert_eq!(store.count(Some("bob".to_string())).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_patch_semantics() {
        let store = MemoryStore::new();
        let expiry = Utc::now() + Duration::hours(1);

        store
            .create(new_link("patch-me", "https://example.com/", "user_1"))
            .await
            .unwrap();

        // Set destination and expiry
        let updated = store
            .update(
                "patch-me",
                LinkPatch {
                    destination: Some("https://new.example.com/".to_string()),
                    expires_at: Some(Some(expiry)),
                    restore: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.destination, "https://new.example.com/");
        assert_eq!(updated.expires_at, Some(expiry));

        // Clear expiry, leave destination alone
        let cleared = store
            .update(
                "patch-me",
                LinkPatch {
                    destination: None,
                    expires_at: Some(None),
                    restore: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.destination, "https://new.example.com/");
        assert!(cleared.expires_at.is_none());

        // Restore after soft delete
        store.soft_delete("patch-me").await.unwrap();
        let restored = store
            .update(
                "patch-me",
                LinkPatch {
                    restore: true,
                    ..LinkPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(!restored.is_deleted());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("missing", LinkPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_is_idempotent_but_reports_once() {
        let store = MemoryStore::new();

        store
            .create(new_link("gone-soon", "https://example.com/", "user_1"))
            .await
            .unwrap();

        assert!(store.soft_delete("gone-soon").await.unwrap());
        assert!(!store.soft_delete("gone-soon").await.unwrap());
        assert!(!store.soft_delete("never-was").await.unwrap());

        // Row still present for lookups
        let link = store.find_by_code("gone-soon").await.unwrap().unwrap();
        assert!(link.is_deleted());
    }

    #[tokio::test]
    async fn test_purge_removes_links_and_their_clicks() {
        let store = MemoryStore::new();

        let old = store
            .create(NewLink {
                code: "old-link".to_string(),
                destination: "https://example.com/".to_string(),
                owner: "user_1".to_string(),
                expires_at: Some(Utc::now() - Duration::days(60)),
            })
            .await
            .unwrap();
        store
            .create(new_link("fresh", "https://example.com/fresh", "user_1"))
            .await
            .unwrap();

        store
            .insert_clicks(vec![NewClick {
                link_id: old.id,
                occurred_at: Utc::now(),
                ip: None,
                user_agent: None,
                referer: None,
                country: None,
            }])
            .await
            .unwrap();

        let purged = store
            .purge_expired_before(Utc::now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(purged, vec!["old-link".to_string()]);

        assert!(store.find_by_code("old-link").await.unwrap().is_none());
        assert!(store.find_by_code("fresh").await.unwrap().is_some());
        assert_eq!(store.count_clicks(old.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_covers_stale_soft_deletes() {
        let store = MemoryStore::new();

        store
            .create(new_link("trashed", "https://example.com/a", "user_1"))
            .await
            .unwrap();
        store
            .create(new_link("just-trashed", "https://example.com/b", "user_1"))
            .await
            .unwrap();
        assert!(store.soft_delete("trashed").await.unwrap());
        assert!(store.soft_delete("just-trashed").await.unwrap());

        // Backdate one deletion past the retention window
        {
            let mut inner = store.inner.write().await;
            if let Some(link) = inner.links.get_mut("trashed") {
                link.deleted_at = Some(Utc::now() - Duration::days(60));
            }
        }

        let purged = store
            .purge_expired_before(Utc::now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(purged, vec!["trashed".to_string()]);

        // The recent delete stays restorable until its window passes
        assert!(store.find_by_code("just-trashed").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_and_read_clicks() {
        let store = MemoryStore::new();
        let link = store
            .create(new_link("clicky", "https://example.com/", "user_1"))
            .await
            .unwrap();

        let base = Utc::now();
        let clicks: Vec<NewClick> = (0..3)
            .map(|i| NewClick {
                link_id: link.id,
                occurred_at: base + Duration::seconds(i),
                ip: Some(format!("10.0.0.{i}")),
                user_agent: None,
                referer: None,
                country: None,
            })
            .collect();
        store.insert_clicks(clicks).await.unwrap();

        let recent = store.recent_clicks(link.id, 0, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].ip.as_deref(), Some("10.0.0.2"));

        assert_eq!(store.count_clicks(link.id).await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bumps_lose_no_counts() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(new_link("hot-link", "https://example.com/", "user_1"))
            .await
            .unwrap();

        let tasks: i64 = 8;
        let bumps_per_task: i64 = 50;

        let mut handles = Vec::new();
        for _ in 0..tasks {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..bumps_per_task {
                    store
                        .bump_click_counts(vec![("hot-link".to_string(), 1)])
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let link = store.find_by_code("hot-link").await.unwrap().unwrap();
        assert_eq!(link.click_count, tasks * bumps_per_task);
    }

    #[tokio::test]
    async fn test_bump_unknown_code_is_ignored() {
        let store = MemoryStore::new();
        store
            .bump_click_counts(vec![("missing".to_string(), 3)])
            .await
            .unwrap();
    }
}
