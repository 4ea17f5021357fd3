//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching, and geo lookups.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory storage backends
//! - [`geoip`] - Country resolution for click analytics

pub mod cache;
pub mod geoip;
pub mod persistence;
