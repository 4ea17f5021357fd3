//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{LinkPatch, NewLink, ShortLink};
use crate::domain::repositories::{LinkRepository, ListFilter};
use crate::error::AppError;

/// Column list shared by every query that materializes a [`ShortLink`].
const LINK_COLUMNS: &str =
    "id, code, destination, owner, created_at, expires_at, click_count, deleted_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    destination: String,
    owner: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    click_count: i64,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink::new(
            r.id,
            r.code,
            r.destination,
            r.owner,
            r.created_at,
            r.expires_at,
            r.click_count,
            r.deleted_at,
        )
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Queries are bound at runtime so the crate builds without a live database.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<ShortLink, AppError> {
        let row: LinkRow = sqlx::query_as(&format!(
            "INSERT INTO links (code, destination, owner, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(&new_link.code)
        .bind(&new_link.destination)
        .bind(&new_link.owner)
        .bind(new_link.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let row: Option<LinkRow> =
            sqlx::query_as(&format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1"))
                .bind(code)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(row.map(Into::into))
    }

    async fn find_active_by_destination(
        &self,
        destination: &str,
        owner: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let row: Option<LinkRow> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE destination = $1
               AND owner = $2
               AND deleted_at IS NULL
               AND (expires_at IS NULL OR expires_at > now())
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(destination)
        .bind(owner)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<ShortLink>, AppError> {
        let rows: Vec<LinkRow> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR owner = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(filter.owner)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, owner: Option<String>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM links
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR owner = $1)",
        )
        .bind(owner)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<ShortLink, AppError> {
        // Three-state expiry (keep / set / clear) is modelled with a touched
        // flag plus the new value, so one statement covers every combination.
        let expires_touched = patch.expires_at.is_some();
        let expires_value = patch.expires_at.flatten();

        let row: Option<LinkRow> = sqlx::query_as(&format!(
            "UPDATE links SET
                 destination = COALESCE($2, destination),
                 expires_at  = CASE WHEN $3 THEN $4 ELSE expires_at END,
                 deleted_at  = CASE WHEN $5 THEN NULL ELSE deleted_at END
             WHERE code = $1
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(code)
        .bind(patch.destination)
        .bind(expires_touched)
        .bind(expires_value)
        .bind(patch.restore)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into).ok_or_else(|| {
            AppError::not_found("Short link not found", serde_json::json!({ "code": code }))
        })
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE links SET deleted_at = now() WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let codes: Vec<String> = sqlx::query_scalar(
            "DELETE FROM links
             WHERE (expires_at IS NOT NULL AND expires_at < $1)
                OR (deleted_at IS NOT NULL AND deleted_at < $1)
             RETURNING code",
        )
        .bind(cutoff)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(codes)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
