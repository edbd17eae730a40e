//! # Taskify Shared Library
//!
//! This crate contains the shared types and business logic used by the
//! Taskify API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `db`: Connection pool and migrations
//! - `ordering`: The Kanban task ordering engine
//! - `realtime`: Project-scoped broadcast channel (Redis pub/sub)

pub mod db;
pub mod models;
pub mod ordering;
pub mod realtime;

/// Current version of the Taskify shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
