//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod resolver;
pub mod stats_service;

pub use auth_service::AuthService;
pub use link_service::{CreateLink, LinkService};
pub use resolver::{RedirectResolver, Resolution};
pub use stats_service::{LinkStatsReport, StatsService};
