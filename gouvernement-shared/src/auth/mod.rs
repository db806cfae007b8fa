/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: access and refresh tokens
/// - [`middleware`]: bearer-token middleware producing the request [`middleware::Actor`]
/// - [`gate`]: role and attribute checks run before route handlers
///
/// # Example
///
/// ```no_run
/// use gouvernement_shared::auth::jwt::{issue_pair, validate_access_token};
/// use gouvernement_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_Passw0rd!")?;
/// assert!(verify_password("user_Passw0rd!", &hash)?);
///
/// let pair = issue_pair(Uuid::new_v4(), "a-secret-of-at-least-thirty-two-bytes")?;
/// let claims = validate_access_token(&pair.access_token, "a-secret-of-at-least-thirty-two-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
