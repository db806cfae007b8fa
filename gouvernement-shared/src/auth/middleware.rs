/// Bearer-token authentication for Axum
///
/// Every `/v1` route outside `/v1/auth` requires an access token in the
/// `Authorization: Bearer <token>` header. The middleware validates it and
/// inserts the request's [`Actor`] into the request extensions, where handlers
/// and authorization gates pick it up.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use gouvernement_shared::auth::middleware::{create_jwt_middleware, Actor};
///
/// async fn whoami(Extension(actor): Extension<Actor>) -> String {
///     actor.user_id.to_string()
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_jwt_middleware("a-secret-of-at-least-thirty-two-bytes")));
/// ```

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// The authenticated requester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::InvalidFormat(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };

        let body = Json(json!({ "error": code, "message": self.to_string() }));
        (status, body).into_response()
    }
}

/// Resolves the actor from request headers
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Actor, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid token issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {other}")),
    })?;

    Ok(Actor {
        user_id: claims.sub,
    })
}

/// Validates the bearer token and inserts the [`Actor`]
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let actor = authenticate(req.headers(), &secret)?;
    tracing::debug!(user_id = %actor.user_id, "Authenticated request");

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>;

/// Wraps [`jwt_auth_middleware`] for `axum::middleware::from_fn`
pub fn create_jwt_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    let secret = secret.into();
    move |req: Request, next: Next| -> MiddlewareFuture {
        Box::pin(jwt_auth_middleware(secret.clone(), req, next))
    }
}
