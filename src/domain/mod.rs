//! Domain layer containing business entities and logic.
//!
//! This module implements the core domain logic following Clean Architecture principles.
//! It defines entities, repository interfaces, and domain services independent of
//! infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click recording worker
//! - [`expiry_sweep`] - Periodic removal of stale links
//!
//! # Design Principles
//!
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Background tasks reach storage only through those traits
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves the code and answers immediately
//! 2. A [`click_event::ClickEvent`] goes onto a bounded channel (full queue
//!    drops the event, never the redirect)
//! 3. [`click_worker::run_click_worker`] drains events in batches
//! 4. Detail rows and counter bumps are persisted via
//!    [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod expiry_sweep;
pub mod repositories;
