//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    occurred_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    country: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            occurred_at: r.occurred_at,
            ip: r.ip,
            user_agent: r.user_agent,
            referer: r.referer,
            country: r.country,
        }
    }
}

/// PostgreSQL repository for click rows and counter bumps.
///
/// Batch writes go through `UNNEST` so a whole worker batch is one
/// round-trip regardless of size.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_clicks(&self, clicks: Vec<NewClick>) -> Result<(), AppError> {
        if clicks.is_empty() {
            return Ok(());
        }

        let mut link_ids = Vec::with_capacity(clicks.len());
        let mut occurred_ats = Vec::with_capacity(clicks.len());
        let mut ips = Vec::with_capacity(clicks.len());
        let mut user_agents = Vec::with_capacity(clicks.len());
        let mut referers = Vec::with_capacity(clicks.len());
        let mut countries = Vec::with_capacity(clicks.len());

        for click in clicks {
            link_ids.push(click.link_id);
            occurred_ats.push(click.occurred_at);
            ips.push(click.ip);
            user_agents.push(click.user_agent);
            referers.push(click.referer);
            countries.push(click.country);
        }

        sqlx::query(
            "INSERT INTO link_clicks (link_id, occurred_at, ip, user_agent, referer, country)
             SELECT * FROM UNNEST(
                 $1::bigint[], $2::timestamptz[], $3::text[], $4::text[], $5::text[], $6::text[]
             )",
        )
        .bind(link_ids)
        .bind(occurred_ats)
        .bind(ips)
        .bind(user_agents)
        .bind(referers)
        .bind(countries)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn bump_click_counts(&self, increments: Vec<(String, i64)>) -> Result<(), AppError> {
        if increments.is_empty() {
            return Ok(());
        }

        let (codes, deltas): (Vec<String>, Vec<i64>) = increments.into_iter().unzip();

        // In-place increment; concurrent flushes serialize per row without
        // losing updates.
        sqlx::query(
            "UPDATE links AS l
             SET click_count = l.click_count + v.delta
             FROM (SELECT UNNEST($1::text[]) AS code, UNNEST($2::bigint[]) AS delta) AS v
             WHERE l.code = v.code",
        )
        .bind(codes)
        .bind(deltas)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn recent_clicks(
        &self,
        link_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Click>, AppError> {
        let rows: Vec<ClickRow> = sqlx::query_as(
            "SELECT id, link_id, occurred_at, ip, user_agent, referer, country
             FROM link_clicks
             WHERE link_id = $1
             ORDER BY occurred_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(link_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
