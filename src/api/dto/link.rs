//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::sync::LazyLock;
use validator::Validate;

use super::pagination::{PaginationMeta, PaginationParams};
use crate::domain::entities::ShortLink;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Destination URL (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Owner identifier attributed by the dashboard backend.
    #[validate(length(min = 1, max = 128))]
    pub owner: String,

    /// Optional custom short code (validated for length and characters).
    #[validate(length(min = 4, max = 32))]
    #[validate(regex(path = "*CUSTOM_CODE_REGEX"))]
    pub custom_code: Option<String>,

    /// Optional expiry timestamp. After this time, the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PATCH /api/links/{code}`.
///
/// All fields are optional — only provided fields are changed.
///
/// # `expires_at` semantics
///
/// - **Absent** (`expires_at` not in JSON) → leave existing value unchanged
/// - **`null`** → clear expiry (link never expires)
/// - **Timestamp** → set new expiry
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    /// New destination URL for this link.
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    /// Expiry timestamp. Absent = no change, null = clear, value = set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    /// When present, must match the stored owner (403 otherwise).
    pub owner: Option<String>,

    /// When true, clears `deleted_at` to restore a soft-deleted link.
    #[serde(default)]
    pub restore: bool,
}

/// Query parameters for `GET /api/links`.
#[derive(Debug, Deserialize)]
pub struct ListLinksParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Restrict the listing to one owner.
    pub owner: Option<String>,
}

/// Query parameters carrying an optional acting owner.
#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    pub owner: Option<String>,
}

/// JSON representation of a short link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub url: String,
    pub owner: String,
    pub status: LinkStatus,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a link as seen by redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Active,
    Expired,
    Deleted,
}

impl From<ShortLink> for LinkResponse {
    fn from(link: ShortLink) -> Self {
        // Deleted wins over expired: a deleted link 404s even when its
        // expiry has also passed.
        let status = if link.is_deleted() {
            LinkStatus::Deleted
        } else if link.is_expired() {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        };

        Self {
            code: link.code,
            url: link.destination,
            owner: link.owner,
            status,
            click_count: link.click_count,
            created_at: link.created_at,
            expires_at: link.expires_at,
            deleted_at: link.deleted_at,
        }
    }
}

/// Paginated list of links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>, deleted_at: Option<DateTime<Utc>>) -> ShortLink {
        ShortLink::new(
            1,
            "abc123xyz00".to_string(),
            "https://example.com/".to_string(),
            "user_1".to_string(),
            Utc::now(),
            expires_at,
            0,
            deleted_at,
        )
    }

    #[test]
    fn test_status_active() {
        let response = LinkResponse::from(link(None, None));
        assert_eq!(response.status, LinkStatus::Active);
    }

    #[test]
    fn test_status_expired() {
        let response = LinkResponse::from(link(Some(Utc::now() - Duration::hours(1)), None));
        assert_eq!(response.status, LinkStatus::Expired);
    }

    #[test]
    fn test_status_deleted_wins_over_expired() {
        let response = LinkResponse::from(link(
            Some(Utc::now() - Duration::hours(1)),
            Some(Utc::now()),
        ));
        assert_eq!(response.status, LinkStatus::Deleted);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let value = serde_json::to_value(LinkStatus::Active).unwrap();
        assert_eq!(value, serde_json::json!("active"));
    }

    #[test]
    fn test_update_request_expiry_tristate() {
        let absent: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.expires_at, None);

        let cleared: UpdateLinkRequest = serde_json::from_str(r#"{"expires_at": null}"#).unwrap();
        assert_eq!(cleared.expires_at, Some(None));

        let set: UpdateLinkRequest =
            serde_json::from_str(r#"{"expires_at": "2027-01-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(set.expires_at, Some(Some(_))));
    }

    #[test]
    fn test_create_request_validates_custom_code() {
        let bad = CreateLinkRequest {
            url: "https://example.com".to_string(),
            owner: "user_1".to_string(),
            custom_code: Some("Bad_Code".to_string()),
            expires_at: None,
        };
        assert!(bad.validate().is_err());

        let good = CreateLinkRequest {
            url: "https://example.com".to_string(),
            owner: "user_1".to_string(),
            custom_code: Some("good-code".to_string()),
            expires_at: None,
        };
        assert!(good.validate().is_ok());
    }
}
