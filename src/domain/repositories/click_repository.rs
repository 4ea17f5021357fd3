//! Repository trait for click persistence and statistics.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recorded clicks.
///
/// Writes happen in batches from the click worker; reads back the stats
/// endpoint. Counter bumps are separate from row inserts so the denormalized
/// `click_count` stays correct even when detail rows are trimmed later.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Inserts a batch of click rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn insert_clicks(&self, clicks: Vec<NewClick>) -> Result<(), AppError>;

    /// Applies aggregated click-count increments, one `(code, delta)` pair
    /// per link.
    ///
    /// Increments are applied atomically in storage (`click_count =
    /// click_count + delta`), never read-modify-write, so concurrent flushes
    /// cannot lose counts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn bump_click_counts(&self, increments: Vec<(String, i64)>) -> Result<(), AppError>;

    /// Returns a page of recorded clicks for a link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn recent_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Click>, AppError>;

    /// Counts recorded click rows for a link.
    ///
    /// May lag the denormalized `click_count` while events sit in the queue.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on storage errors.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError>;
}
