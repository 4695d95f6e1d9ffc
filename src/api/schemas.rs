use serde::{Deserialize, Serialize};

use crate::db::models::{Like, User};
use crate::db::storage::TweetFeedItem;

#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub tweet_data: String,
    pub tweet_media_ids: Vec<i32>,
}

/// Bare success body shared by mutation endpoints.
#[derive(Debug, Serialize)]
pub struct Answer {
    pub result: bool,
}

impl Answer {
    pub fn ok() -> Self {
        Self { result: true }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTweetResponse {
    pub result: bool,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct UploadMediaResponse {
    pub result: bool,
    pub media_id: i32,
}

#[derive(Debug, Serialize)]
pub struct UserBrief {
    pub id: i32,
    pub name: String,
}

impl From<User> for UserBrief {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeOut {
    pub user_id: i32,
    pub name: String,
}

impl From<Like> for LikeOut {
    fn from(like: Like) -> Self {
        Self {
            user_id: like.user_id,
            name: like.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TweetOut {
    pub id: i32,
    pub content: String,
    pub author: UserBrief,
    pub attachments: Vec<String>,
    pub likes: Vec<LikeOut>,
}

impl From<TweetFeedItem> for TweetOut {
    fn from(item: TweetFeedItem) -> Self {
        Self {
            id: item.id,
            content: item.content,
            author: UserBrief {
                id: item.author_id,
                name: item.author_name,
            },
            attachments: item.attachment_links,
            likes: item.likes.into_iter().map(LikeOut::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TweetsResponse {
    pub result: bool,
    pub tweets: Vec<TweetOut>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub followers: Vec<UserBrief>,
    pub following: Vec<UserBrief>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub result: bool,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_tweet_request_parses_contract_fields() {
        let req: CreateTweetRequest =
            serde_json::from_value(json!({"tweet_data": "hello", "tweet_media_ids": [1, 2]}))
                .unwrap();
        assert_eq!(req.tweet_data, "hello");
        assert_eq!(req.tweet_media_ids, vec![1, 2]);
    }

    #[test]
    fn tweet_out_serializes_feed_item() {
        let item = TweetFeedItem {
            id: 1,
            content: "hello".to_string(),
            author_id: 2,
            author_name: "alice".to_string(),
            likes: vec![Like {
                tweet_id: 1,
                user_id: 3,
                name: "bob".to_string(),
            }],
            attachment_links: vec!["images/5_cat.png".to_string()],
        };
        let value = serde_json::to_value(TweetOut::from(item)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "content": "hello",
                "author": {"id": 2, "name": "alice"},
                "attachments": ["images/5_cat.png"],
                "likes": [{"user_id": 3, "name": "bob"}],
            })
        );
    }
}
