//! Storage backend implementations.
//!
//! Concrete implementations of the domain repository traits. Queries are
//! bound at runtime, so no live database is needed to build the crate.
//!
//! # Backends
//!
//! - [`PgLinkRepository`] / [`PgClickRepository`] - PostgreSQL, the
//!   production backend
//! - [`MemoryStore`] - In-memory backend for development and tests,
//!   implementing both repository traits

pub mod memory;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory::MemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
