//! Client library for a personal recipe manager.
//!
//! The pieces, leaf first:
//! - [`cache`]: persisted list cache and version-incremental sync
//! - [`recipe`]: record types and the REST client
//! - [`keywords`]: frequency-ranked keyword vocabulary
//! - [`filter`]: keyword filter, search and title ordering
//! - [`session`]: selection state for an interactive view

pub mod auth;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod logging;
pub mod recipe;
pub mod session;
