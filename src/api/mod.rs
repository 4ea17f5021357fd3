//! HTTP layer: the public redirect surface and the management REST API.
//!
//! Translates requests into domain operations and formats responses —
//! HTML fallback pages for visitors, JSON for the management API.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication, rate limiting, and tracing middleware
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
