use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::db::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the caller's opaque API key.
pub const API_KEY_HEADER: &str = "api-key";

/// Authenticated caller resolved from the `api-key` header.
///
/// This is the system's sole authentication mechanism: the key is looked up
/// against the user table on every request, with no sessions and no expiry.
/// A missing or unknown key rejects the request with the structured 404 body
/// before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::not_found("Not found user by api-key"))?;

        let user = state
            .storage
            .user_by_api_key(api_key)
            .await?
            .ok_or_else(|| ApiError::not_found("Not found user by api-key"))?;

        Ok(CurrentUser(user))
    }
}
