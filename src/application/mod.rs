//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::resolver::RedirectResolver`] - Code-to-destination resolution
//! - [`services::link_service::LinkService`] - Short link creation and management
//! - [`services::stats_service::StatsService`] - Click statistics
//! - [`services::auth_service::AuthService`] - Admin token authentication

pub mod services;
