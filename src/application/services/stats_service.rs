//! Click statistics service.

use std::sync::Arc;

use crate::domain::entities::{Click, ShortLink};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use serde_json::json;

/// Statistics for a single short link.
///
/// `link.click_count` is the denormalized total kept on the link row.
/// `recorded` counts the stored click detail rows; it can trail the total
/// while events sit in the recording queue.
#[derive(Debug, Clone)]
pub struct LinkStatsReport {
    pub link: ShortLink,
    pub recorded: i64,
    pub recent: Vec<Click>,
}

/// Service for retrieving per-link click statistics.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
}

impl StatsService {
    /// Creates a new statistics service.
    pub fn new(links: Arc<dyn LinkRepository>, clicks: Arc<dyn ClickRepository>) -> Self {
        Self { links, clicks }
    }

    /// Retrieves statistics for a short code.
    ///
    /// Works for deleted and expired links too, so history stays
    /// inspectable after a link leaves circulation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_stats(
        &self,
        code: &str,
        offset: i64,
        limit: i64,
    ) -> Result<LinkStatsReport, AppError> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        let recorded = self.clicks.count_clicks(link.id).await?;
        let recent = self.clicks.recent_clicks(link.id, offset, limit).await?;

        Ok(LinkStatsReport {
            link,
            recorded,
            recent,
        })
    }
}
