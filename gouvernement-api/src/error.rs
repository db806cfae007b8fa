/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; the error becomes the HTTP response.
/// Library errors convert with `?`:
///
/// | Source | Response |
/// |---|---|
/// | `GateError::Denied` | 303 with `Location` and a redirect body |
/// | `GateError::NotFound` | 404 |
/// | `GateError::MalformedParam` | 404, no route matches the id |
/// | `ResolveError::UnknownEmail` | 422 on the people field |
/// | `PasswordError::TooWeak` | 422 on `password` |
/// | `validator::ValidationErrors` | 422, one detail per message |
/// | `sqlx::Error` | 422 on a taken email, 409 on other unique violations, 500 otherwise |
///
/// # Example
///
/// ```
/// use gouvernement_api::error::{ApiError, ApiResult};
///
/// fn parse_priority(raw: &str) -> ApiResult<i32> {
///     raw.parse()
///         .map_err(|_| ApiError::field("priority", "The project priority has not been set."))
/// }
///
/// assert!(parse_priority("3").is_ok());
/// ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gouvernement_shared::{
    auth::{gate::GateError, jwt::JwtError, middleware::AuthError, password::PasswordError},
    resolver::ResolveError,
    search::SearchError,
};
use serde::{Deserialize, Serialize};

/// Message for a registration with an email already in use
pub const EMAIL_TAKEN: &str = "Email already exists";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Refused by an authorization gate (303 to `redirect_to`)
    #[error("Denied: {message}")]
    Denied { message: String, redirect_to: String },

    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (409), a unique constraint other than the email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity (422)
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Service unavailable (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

/// Body of a gate denial
#[derive(Debug, Serialize, Deserialize)]
pub struct DeniedResponse {
    /// Always `"error"`
    pub category: String,

    pub message: String,

    pub redirect_to: String,
}

impl ApiError {
    /// A validation failure on a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Denied { message, redirect_to } => return denied(message, redirect_to),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Denials redirect instead of carrying an error code
fn denied(message: String, redirect_to: String) -> Response {
    let location =
        HeaderValue::from_str(&redirect_to).unwrap_or_else(|_| HeaderValue::from_static("/"));

    let body = Json(DeniedResponse {
        category: "error".to_string(),
        message,
        redirect_to,
    });

    let mut response = (StatusCode::SEE_OTHER, body).into_response();
    response.headers_mut().insert(header::LOCATION, location);
    response
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::field("email", EMAIL_TAKEN);
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // field_errors is a HashMap; keep responses stable
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Denied { message, redirect_to } => ApiError::Denied { message, redirect_to },
            GateError::NotFound { .. } | GateError::MalformedParam { .. } => {
                ApiError::NotFound(err.to_string())
            }
            GateError::Database(e) => ApiError::from(e),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Database(e) => ApiError::from(e),
            // Pair-level failures are skipped during compilation
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownEmail(email) => ApiError::field(
                "emails",
                format!("No user is registered with email {email:?}."),
            ),
            ResolveError::Database(e) => ApiError::from(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Missing credentials".to_string()),
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooWeak(message) => ApiError::field("password", message),
            other => ApiError::InternalError(format!("Password operation failed: {}", other)),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(format!("Token creation failed: {}", msg)),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}
