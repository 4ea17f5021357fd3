//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// An in-memory representation of a click event for async processing.
///
/// Used to pass click information from the redirect handler to the background
/// worker via a channel. This decouples the HTTP response from database
/// writes, allowing fast redirects without blocking.
///
/// # Design
///
/// - Carries the resolved `link_id` so the worker never has to look the code
///   up again (the redirect path already paid for that lookup)
/// - Records `occurred_at` at creation time; the worker flushes in delayed
///   batches, so insert time is not click time
/// - All client metadata is optional to handle missing headers gracefully
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub code: String,
    pub occurred_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    /// Creates a new click event stamped with the current time.
    pub fn new(
        link_id: i64,
        code: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            code,
            occurred_at: Utc::now(),
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation_full() {
        let event = ClickEvent::new(
            42,
            "abc123".to_string(),
            Some("192.168.1.1".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
        );

        assert_eq!(event.link_id, 42);
        assert_eq!(event.code, "abc123");
        assert_eq!(event.ip, Some("192.168.1.1".to_string()));
        assert_eq!(event.user_agent, Some("Mozilla/5.0".to_string()));
        assert_eq!(event.referer, Some("https://google.com".to_string()));
    }

    #[test]
    fn test_click_event_creation_minimal() {
        let event = ClickEvent::new(7, "xyz".to_string(), None, None, None);

        assert_eq!(event.link_id, 7);
        assert_eq!(event.code, "xyz");
        assert!(event.ip.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.referer.is_none());
    }

    #[test]
    fn test_click_event_timestamped_at_creation() {
        let before = Utc::now();
        let event = ClickEvent::new(1, "code1".to_string(), None, None, None);
        let after = Utc::now();

        assert!(event.occurred_at >= before);
        assert!(event.occurred_at <= after);
    }
}
