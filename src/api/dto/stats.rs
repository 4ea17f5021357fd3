//! DTOs for per-link click statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::pagination::PaginationMeta;
use crate::application::services::LinkStatsReport;
use crate::domain::entities::Click;

/// Statistics for a specific short link.
///
/// `total_clicks` is the denormalized counter kept on the link row;
/// `recorded` counts stored detail rows and can trail it while events
/// wait in the recording queue.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub pagination: PaginationMeta,
    pub code: String,
    pub url: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub total_clicks: i64,
    pub recorded: i64,
    pub items: Vec<ClickInfo>,
}

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub occurred_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl From<Click> for ClickInfo {
    fn from(click: Click) -> Self {
        Self {
            occurred_at: click.occurred_at,
            ip: click.ip,
            user_agent: click.user_agent,
            referer: click.referer,
            country: click.country,
        }
    }
}

impl StatsResponse {
    /// Assembles the response from a stats report and pagination metadata.
    pub fn from_report(report: LinkStatsReport, pagination: PaginationMeta) -> Self {
        Self {
            pagination,
            code: report.link.code,
            url: report.link.destination,
            owner: report.link.owner,
            created_at: report.link.created_at,
            total_clicks: report.link.click_count,
            recorded: report.recorded,
            items: report.recent.into_iter().map(ClickInfo::from).collect(),
        }
    }
}
