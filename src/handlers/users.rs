use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::schemas::{ProfileResponse, UserBrief, UserProfile};
use crate::auth::CurrentUser;
use crate::db::models::User;
use crate::db::storage::Storage;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves a user's followers (incoming edges) and followees (via their
/// lazily-created follow list), each reduced to `{id, name}`.
async fn build_profile(storage: &Storage, user: &User) -> Result<UserProfile, ApiError> {
    let follower_ids = storage.follower_ids_of(user.id).await?;
    let followers = storage.users_by_ids(&follower_ids).await?;

    let following = match storage.follow_list_by_user(user.id).await? {
        Some(list) => {
            let following_ids = storage.following_ids_of(list.user_id).await?;
            storage.users_by_ids(&following_ids).await?
        }
        None => Vec::new(),
    };

    Ok(UserProfile {
        id: user.id,
        name: user.name.clone(),
        followers: followers.into_iter().map(UserBrief::from).collect(),
        following: following.into_iter().map(UserBrief::from).collect(),
    })
}

/// GET /api/users/me - the caller's own profile.
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = build_profile(&state.storage, &user).await?;
    Ok(Json(ProfileResponse {
        result: true,
        user: profile,
    }))
}

/// GET /api/users/:id - profile by id. This route takes no API key.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .storage
        .user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found user by id"))?;
    let profile = build_profile(&state.storage, &user).await?;
    Ok(Json(ProfileResponse {
        result: true,
        user: profile,
    }))
}
