//! Utility functions for code generation, URL processing, and request handling.
//!
//! This module provides helper functions used across the application:
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_normalizer`] - Destination URL normalization
//! - [`client_ip`] - Client IP resolution from socket or forwarded headers

pub mod client_ip;
pub mod code_generator;
pub mod url_normalizer;
