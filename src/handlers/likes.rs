use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::schemas::Answer;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/tweets/:id/likes - like a tweet.
///
/// No duplicate check here: the (tweet, user) primary key rejects a second
/// like at the store level and the violation surfaces as a conflict body.
pub async fn add_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Answer>, ApiError> {
    let tweet = state
        .storage
        .tweet_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found tweet by id"))?;
    state
        .storage
        .insert_like(tweet.id, user.id, &user.name)
        .await?;
    Ok(Json(Answer::ok()))
}

/// DELETE /api/tweets/:id/likes - remove the caller's like.
/// Absence of the like is treated as success.
pub async fn remove_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Answer>, ApiError> {
    let tweet = state
        .storage
        .tweet_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found tweet by id"))?;
    if state.storage.like_by(tweet.id, user.id).await?.is_some() {
        state.storage.delete_like(tweet.id, user.id).await?;
    }
    Ok(Json(Answer::ok()))
}
