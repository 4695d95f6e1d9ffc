use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::schemas::{Answer, CreateTweetRequest, CreateTweetResponse, TweetOut, TweetsResponse};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/tweets - create a tweet, then attach previously uploaded media.
///
/// The insert and the media reassignment are two gateway calls without an
/// outer transaction: a failure after the insert leaves the tweet without its
/// media. Attachment ids are not validated against ownership.
pub async fn create_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateTweetRequest>,
) -> Result<Json<CreateTweetResponse>, ApiError> {
    let tweet_id = state.storage.insert_tweet(user.id, &body.tweet_data).await?;
    state
        .storage
        .reassign_attachments_to_tweet(&body.tweet_media_ids, tweet_id)
        .await?;
    Ok(Json(CreateTweetResponse {
        result: true,
        id: tweet_id,
    }))
}

/// DELETE /api/tweets/:id - delete an owned tweet, its media files and
/// (via cascade) its likes and attachment rows.
pub async fn delete_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Answer>, ApiError> {
    let tweet = state
        .storage
        .tweet_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found tweet by id"))?;
    if tweet.user_id != user.id {
        return Err(ApiError::forbidden("Tweet author is not user"));
    }

    for attachment in state.storage.attachments_by_tweet(tweet.id).await? {
        if let Some(file_name) = attachment.file_name {
            let path = state.images_dir().join(&file_name);
            tokio::fs::remove_file(&path).await.map_err(|err| {
                tracing::error!("Failed to remove {}: {}", path.display(), err);
                ApiError::internal_server_error("Failed to remove attachment file")
            })?;
        }
    }

    state.storage.delete_tweet(tweet.id).await?;
    Ok(Json(Answer::ok()))
}

/// GET /api/tweets - the global feed: every tweet with author, likes and
/// attachment links. No pagination, no filtering by the follow graph.
pub async fn list_tweets(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<TweetsResponse>, ApiError> {
    let tweets = state
        .storage
        .list_tweet_feed()
        .await?
        .into_iter()
        .map(TweetOut::from)
        .collect();
    Ok(Json(TweetsResponse {
        result: true,
        tweets,
    }))
}
