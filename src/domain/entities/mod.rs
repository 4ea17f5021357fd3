//! Core domain entities representing the business data model.
//!
//! This module contains the fundamental data structures that represent the core
//! concepts of the redirect gateway. Entities are plain data structures
//! without business logic.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A short code mapped to a destination URL
//! - [`Click`] - A recorded redirect through a short link
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewLink`, `NewClick` - For creating new records
//! - `LinkPatch` - For partial updates

pub mod click;
pub mod link;

pub use click::{Click, NewClick};
pub use link::{LinkPatch, NewLink, ShortLink};
