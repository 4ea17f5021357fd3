//! Click entity representing a single recorded redirect.

use chrono::{DateTime, Utc};

/// A click recorded against a short link.
///
/// Captures request metadata for analytics. All client fields are optional
/// since headers may be absent or stripped by proxies.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country: Option<String>,
}

/// Input data for persisting a click.
///
/// Carries its own `occurred_at` because clicks are written in delayed
/// batches; the insert time is not the click time.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country: Option<String>,
}
