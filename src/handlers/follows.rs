use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::schemas::Answer;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/users/:id/follow - follow the target user.
///
/// The caller's follow list is created lazily on their first follow action;
/// a duplicate edge for the same (target, caller) pair is rejected.
pub async fn follow_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Answer>, ApiError> {
    let target = state
        .storage
        .user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found user by id"))?;

    let list = match state.storage.follow_list_by_user(user.id).await? {
        Some(list) => list,
        None => state.storage.insert_follow_list(user.id, &user.name).await?,
    };

    if state
        .storage
        .follow_edge(target.id, list.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("The user has already followed"));
    }

    state
        .storage
        .insert_follow_edge(target.id, list.user_id)
        .await?;
    Ok(Json(Answer::ok()))
}

/// DELETE /api/users/:id/follow - unfollow the target user.
/// Unfollowing without an existing edge is a conflict.
pub async fn unfollow_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Answer>, ApiError> {
    let target = state
        .storage
        .user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found user by id"))?;

    if state
        .storage
        .follow_edge(target.id, user.id)
        .await?
        .is_none()
    {
        return Err(ApiError::conflict("The user is no following"));
    }

    state.storage.delete_follow_edge(target.id, user.id).await?;
    Ok(Json(Answer::ok()))
}
