//! HTTP middleware.
//!
//! The bearer-token guard and rate limiter apply to the management API
//! only; request tracing wraps every route, redirects included.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
