// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::db::storage::StorageError;

/// HTTP API error with appropriate status codes and the uniform error body
/// `{result: false, error_type, error_message}` shared by every handler.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 400 - caller is not the owner of the resource
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 400 - duplicate follow, missing unfollow edge, double like
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code. The API contract exposes only 404, 400 and 500;
    /// Forbidden and Conflict keep distinct `error_type` strings instead of
    /// distinct statuses.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Forbidden(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 400,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error type label for client handling
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "Bad Request",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Conflict(_) => "Conflict",
            ApiError::InternalServerError(_) => "Internal Server Error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "result": false,
            "error_type": self.error_type(),
            "error_message": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert storage errors to ApiError
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => ApiError::not_found(msg),
            StorageError::ConstraintViolation(msg) => ApiError::conflict(msg),
            StorageError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_contract() {
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::forbidden("x").status_code(), 400);
        assert_eq!(ApiError::conflict("x").status_code(), 400);
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::internal_server_error("x").status_code(), 500);
    }

    #[test]
    fn error_body_is_uniform() {
        let body = ApiError::not_found("Not found tweet by id").to_json();
        assert_eq!(body["result"], json!(false));
        assert_eq!(body["error_type"], json!("Not Found"));
        assert_eq!(body["error_message"], json!("Not found tweet by id"));
    }

    #[test]
    fn constraint_violation_surfaces_as_conflict() {
        let err: ApiError =
            StorageError::ConstraintViolation("duplicate key".to_string()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_type(), "Conflict");
    }
}
