//! # Gouvernement Shared Library
//!
//! Domain types and logic used by the Gouvernement API server.
//!
//! ## Module Organization
//!
//! - `models`: database models for users, projects, tasks and memberships
//! - `db`: connection pool and migrations
//! - `auth`: passwords, tokens, the request actor and authorization gates
//! - `search`: the `key=<value>` search and sort language for listings
//! - `resolver`: comma-separated email lists to users
//! - `progress`: project progress from task statuses

pub mod auth;
pub mod db;
pub mod models;
pub mod progress;
pub mod resolver;
pub mod search;

/// Current version of the Gouvernement shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
