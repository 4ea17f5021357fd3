//! Link creation and management service.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{LinkPatch, NewLink, ShortLink};
use crate::domain::repositories::{LinkRepository, ListFilter};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::url_normalizer::normalize_destination;
use serde_json::json;

/// Input for creating a short link.
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub url: String,
    pub owner: String,
    pub custom_code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating and managing short links.
///
/// Handles destination normalization, code generation/validation,
/// deduplication, ownership checks on mutations, and cache invalidation
/// when a mapping changes.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(links: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { links, cache }
    }

    /// Creates a short link.
    ///
    /// # Deduplication
    ///
    /// Without a custom code, an existing live link for the same normalized
    /// destination and owner is returned instead of minting a duplicate.
    /// An explicit custom code always creates (or conflicts); callers asking
    /// for a branded code should not silently get a different one.
    ///
    /// # Code Generation
    ///
    /// - If `custom_code` is provided, validates and uses it (or returns a conflict)
    /// - Otherwise, generates a cryptographically secure random 11-character code
    /// - Retries up to 10 times on collision before failing
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a bad URL, bad custom code, or an
    /// expiry in the past, and [`AppError::Conflict`] if the code is taken.
    pub async fn create_link(&self, input: CreateLink) -> Result<ShortLink, AppError> {
        let destination = normalize_destination(&input.url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if input.owner.trim().is_empty() {
            return Err(AppError::bad_request("Owner must not be empty", json!({})));
        }

        if let Some(expires_at) = input.expires_at {
            if expires_at <= Utc::now() {
                return Err(AppError::bad_request(
                    "expires_at must be in the future",
                    json!({ "expires_at": expires_at }),
                ));
            }
        }

        let code = if let Some(custom) = input.custom_code {
            validate_custom_code(&custom)?;

            if self.links.find_by_code(&custom).await?.is_some() {
                return Err(AppError::conflict(
                    "Custom code already exists",
                    json!({ "code": custom }),
                ));
            }

            custom
        } else {
            if let Some(existing) = self
                .links
                .find_active_by_destination(&destination, &input.owner)
                .await?
            {
                return Ok(existing);
            }

            self.generate_unique_code().await?
        };

        self.links
            .create(NewLink {
                code,
                destination,
                owner: input.owner,
                expires_at: input.expires_at,
            })
            .await
    }

    /// Retrieves a link by its short code, whatever its lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_link(&self, code: &str) -> Result<ShortLink, AppError> {
        self.links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Lists links with pagination, optionally scoped to an owner.
    ///
    /// Returns the page and the total count for pagination metadata.
    pub async fn list_links(
        &self,
        owner: Option<String>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ShortLink>, i64), AppError> {
        let total = self.links.count(owner.clone()).await?;
        let links = self
            .links
            .list(ListFilter::new(offset, limit).with_owner(owner))
            .await?;

        Ok((links, total))
    }

    /// Partially updates a link and invalidates its cache entry.
    ///
    /// `acting_owner`, when present, must match the stored owner.
    /// The destination, if updated, is normalized like on create.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes,
    /// [`AppError::Forbidden`] on owner mismatch, and
    /// [`AppError::Validation`] for a bad replacement URL.
    pub async fn update_link(
        &self,
        code: &str,
        mut patch: LinkPatch,
        acting_owner: Option<String>,
    ) -> Result<ShortLink, AppError> {
        let existing = self.get_link(code).await?;
        self.check_owner(&existing, acting_owner.as_deref())?;

        if let Some(url) = patch.destination.take() {
            let destination = normalize_destination(&url).map_err(|e| {
                AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
            })?;
            patch.destination = Some(destination);
        }

        let updated = self.links.update(code, patch).await?;
        self.invalidate_cache(code).await;

        Ok(updated)
    }

    /// Soft-deletes a link and invalidates its cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or the link is
    /// already deleted, and [`AppError::Forbidden`] on owner mismatch.
    pub async fn delete_link(
        &self,
        code: &str,
        acting_owner: Option<String>,
    ) -> Result<(), AppError> {
        let existing = self.get_link(code).await?;
        self.check_owner(&existing, acting_owner.as_deref())?;

        let deleted = self.links.soft_delete(code).await?;
        if !deleted {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        self.invalidate_cache(code).await;
        Ok(())
    }

    fn check_owner(&self, link: &ShortLink, acting_owner: Option<&str>) -> Result<(), AppError> {
        match acting_owner {
            Some(owner) if owner != link.owner => Err(AppError::forbidden(
                "Link belongs to a different owner",
                json!({ "code": link.code }),
            )),
            _ => Ok(()),
        }
    }

    /// Drops the cached mapping so the next redirect sees fresh state.
    ///
    /// Invalidation is awaited because a stale mapping outliving a mutation
    /// is worse than a slightly slower management call; failures are logged
    /// and swallowed (the TTL still bounds staleness).
    async fn invalidate_cache(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!("Failed to invalidate cache for {}: {}", code, e);
        }
    }

    /// Generates a unique short code with collision retry.
    ///
    /// Attempts up to 10 times before failing.
    async fn generate_unique_code(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let code = generate_code();

            if self.links.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}
