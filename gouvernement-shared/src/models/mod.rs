/// Database models for Gouvernement
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Accounts and credential hashes
/// - `project`: Projects, their listing rows and derived progress
/// - `task`: Tasks inside projects and their listing rows
/// - `membership`: Project collaborators and task assignees
///
/// Writes take a `&mut PgConnection` so that an entity and its membership list
/// commit in one transaction; reads take the pool.
///
/// # Example
///
/// ```no_run
/// use gouvernement_shared::models::user::{User, CreateUser};
/// use gouvernement_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "ada@example.com".to_string(),
///     first_name: "Ada".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
