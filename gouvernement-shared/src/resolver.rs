//! Resolution of comma-separated email lists into users
//!
//! Collaborator and assignee fields, and the people filters of the search
//! language, name users as a comma-separated list of emails:
//!
//! ```text
//! ada@example.com, grace@example.com
//! ```
//!
//! Resolution is all-or-nothing. A blank list resolves to no users. Otherwise
//! every token is trimmed and looked up by exact email; the first token that
//! names no registered user fails the whole list, and no partial result is
//! returned. On success the users come back in input order.
//!
//! Lookups go through the [`UserDirectory`] capability, implemented for
//! `PgPool` and easy to fake in tests.
//!
//! # Example
//!
//! ```no_run
//! use gouvernement_shared::resolver::{resolve_emails, ResolveError};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), ResolveError> {
//! let users = resolve_emails(&pool, "ada@example.com, grace@example.com").await?;
//! assert_eq!(users.len(), 2);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::user::User;

/// Error type for email list resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A token names no registered user
    #[error("No user registered with email {0:?}")]
    UnknownEmail(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Looks users up by email
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
impl UserDirectory for PgPool {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        User::find_by_email(self, email).await
    }
}

/// Splits an email list into trimmed tokens
///
/// Blank input yields no tokens. Empty tokens inside a non-blank list (as in
/// `"a@x.com,,b@x.com"`) are kept so that they fail resolution.
pub fn split_emails(input: &str) -> Vec<&str> {
    if input.trim().is_empty() {
        return Vec::new();
    }

    input.split(',').map(str::trim).collect()
}

/// Resolves a comma-separated email list into users
///
/// # Errors
///
/// - `ResolveError::UnknownEmail` for the first token with no matching user
/// - `ResolveError::Database` if a lookup fails
pub async fn resolve_emails<D>(directory: &D, input: &str) -> Result<Vec<User>, ResolveError>
where
    D: UserDirectory + ?Sized,
{
    let mut users = Vec::new();

    for email in split_emails(input) {
        match directory.find_by_email(email).await? {
            Some(user) => users.push(user),
            None => {
                tracing::debug!(email = %email, "Email list names an unregistered user");
                return Err(ResolveError::UnknownEmail(email.to_string()));
            }
        }
    }

    Ok(users)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    /// In-memory directory for unit tests
    #[derive(Default)]
    pub struct MemoryDirectory {
        pub users: Vec<User>,
    }

    impl MemoryDirectory {
        pub fn with(emails: &[&str]) -> Self {
            let users = emails
                .iter()
                .map(|email| User {
                    id: Uuid::new_v4(),
                    email: email.to_string(),
                    first_name: email.split('@').next().unwrap_or_default().to_string(),
                    password_hash: String::new(),
                    created_at: Utc::now(),
                })
                .collect();
            Self { users }
        }

        pub fn id_of(&self, email: &str) -> Uuid {
            self.users
                .iter()
                .find(|u| u.email == email)
                .map(|u| u.id)
                .expect("user seeded")
        }
    }

    #[async_trait]
    impl UserDirectory for MemoryDirectory {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
            Ok(self.users.iter().find(|u| u.email == email).cloned())
        }
    }
}
