//! Repository trait for short link data access.

use crate::domain::entities::{LinkPatch, NewLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filter criteria for link listings.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub owner: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl ListFilter {
    /// Creates a new filter with pagination parameters.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            owner: None,
            offset,
            limit,
        }
    }

    /// Scopes the listing to a single owner.
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }
}

/// Repository interface for managing short links.
///
/// Provides CRUD operations for shortened URLs, including lookups by code
/// and destination, pagination, and expiry housekeeping.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn create(&self, new_link: NewLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code.
    ///
    /// Returns soft-deleted and expired rows too; callers decide how to
    /// treat lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds a live (not deleted, not expired) link with the given
    /// destination belonging to `owner`.
    ///
    /// Used to return an existing link instead of minting a duplicate code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn find_active_by_destination(
        &self,
        destination: &str,
        owner: &str,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Lists links ordered by creation time, newest first.
    ///
    /// Soft-deleted links are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn list(&self, filter: ListFilter) -> Result<Vec<ShortLink>, AppError>;

    /// Counts links visible to a listing, optionally scoped to an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn count(&self, owner: Option<String>) -> Result<i64, AppError>;

    /// Partially updates a link.
    ///
    /// Only fields present in [`LinkPatch`] are modified. `None` fields are
    /// unchanged. When `patch.restore` is `true`, `deleted_at` is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `code`.
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn update(&self, code: &str, patch: LinkPatch) -> Result<ShortLink, AppError>;

    /// Soft-deletes a link by setting `deleted_at = now()`.
    ///
    /// Returns `Ok(true)` if the link was found and deleted, `Ok(false)` if
    /// not found or already deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn soft_delete(&self, code: &str) -> Result<bool, AppError>;

    /// Hard-deletes links that expired or were soft-deleted before `cutoff`.
    ///
    /// Returns the codes of purged links so callers can drop stale cache
    /// entries. Click rows go with the link (cascade).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<String>, AppError>;

    /// Cheap connectivity probe for health reporting.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when the backend cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
