//! Short link entity representing a code-to-destination mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its lifecycle metadata.
///
/// The `owner` field holds the opaque subject identifier assigned by the
/// upstream identity provider; the gateway never interprets it beyond
/// equality checks.
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub destination: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        code: String,
        destination: String,
        owner: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        click_count: i64,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            code,
            destination,
            owner,
            created_at,
            expires_at,
            click_count,
            deleted_at,
        }
    }

    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub destination: String,
    pub owner: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub destination: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// When `true`, clears `deleted_at` to restore a soft-deleted link.
    pub restore: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_link(
        expires_at: Option<DateTime<Utc>>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> ShortLink {
        ShortLink::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            "user_2x9f".to_string(),
            Utc::now(),
            expires_at,
            0,
            deleted_at,
        )
    }

    #[test]
    fn test_link_creation() {
        let link = sample_link(None, None);

        assert_eq!(link.id, 1);
        assert_eq!(link.code, "abc123");
        assert_eq!(link.destination, "https://example.com");
        assert_eq!(link.owner, "user_2x9f");
        assert_eq!(link.click_count, 0);
        assert!(!link.is_deleted());
        assert!(!link.is_expired());
    }

    #[test]
    fn test_link_is_deleted() {
        let link = sample_link(None, Some(Utc::now()));
        assert!(link.is_deleted());
    }

    #[test]
    fn test_link_is_expired() {
        let link = sample_link(Some(Utc::now() - Duration::seconds(1)), None);
        assert!(link.is_expired());
    }

    #[test]
    fn test_link_future_expiry_not_expired() {
        let link = sample_link(Some(Utc::now() + Duration::hours(1)), None);
        assert!(!link.is_expired());
    }

    #[test]
    fn test_patch_default_changes_nothing() {
        let patch = LinkPatch::default();
        assert!(patch.destination.is_none());
        assert!(patch.expires_at.is_none());
        assert!(!patch.restore);
    }
}
