use sqlx::FromRow;

/// Account identified by its unique API key.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub api_key: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Tweet {
    pub id: i32,
    pub content: String,
    pub user_id: i32,
}

/// Uploaded media object. Created orphaned (no tweet); `file_name` and `link`
/// are filled in a second step once the generated id is known.
#[derive(Debug, Clone, FromRow)]
pub struct Attachment {
    pub id: i32,
    pub tweet_id: Option<i32>,
    pub file_name: Option<String>,
    pub link: Option<String>,
}

/// Like keyed by (tweet, user), carrying a denormalized copy of the liker's name.
#[derive(Debug, Clone, FromRow)]
pub struct Like {
    pub tweet_id: i32,
    pub user_id: i32,
    pub name: String,
}

/// Per-user anchor row for the users they follow. Created lazily on the first
/// follow action.
#[derive(Debug, Clone, FromRow)]
pub struct FollowList {
    pub user_id: i32,
    pub name: String,
}

/// Directed edge: `user_id` (the followed target) is followed by the owner of
/// follow list `follower_id`.
#[derive(Debug, Clone, FromRow)]
pub struct FollowEdge {
    pub user_id: i32,
    pub follower_id: i32,
}
