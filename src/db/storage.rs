use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use super::models::{Attachment, FollowEdge, FollowList, Like, Tweet, User};

/// Errors from the storage gateway
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Maps store-level uniqueness/foreign-key rejections to a distinct error kind
/// so callers can tell them apart from transport failures.
fn map_constraint(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db)
            if matches!(
                db.kind(),
                ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation
            ) =>
        {
            StorageError::ConstraintViolation(db.message().to_string())
        }
        other => StorageError::Sqlx(other),
    }
}

/// Stored file name for an uploaded image: the generated attachment id is
/// prepended so two uploads of the same file never collide on disk.
pub fn attachment_file_name(id: i32, original: &str) -> String {
    format!("{}_{}", id, original)
}

/// Public link mirrored into the attachment row and served by the static
/// `/images` route.
pub fn attachment_link(file_name: &str) -> String {
    format!("images/{}", file_name)
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        api_key VARCHAR(100) NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS tweets (
        id SERIAL PRIMARY KEY,
        content TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users (id)
    )",
    "CREATE TABLE IF NOT EXISTS attachments (
        id SERIAL PRIMARY KEY,
        tweet_id INTEGER REFERENCES tweets (id) ON DELETE CASCADE,
        file_name VARCHAR(100),
        link VARCHAR(200)
    )",
    "CREATE TABLE IF NOT EXISTS likes (
        tweet_id INTEGER NOT NULL REFERENCES tweets (id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users (id),
        name VARCHAR(100) NOT NULL,
        PRIMARY KEY (tweet_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS follow_lists (
        user_id INTEGER PRIMARY KEY REFERENCES users (id),
        name VARCHAR(100) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS follow_edges (
        user_id INTEGER NOT NULL REFERENCES users (id),
        follower_id INTEGER NOT NULL REFERENCES follow_lists (user_id),
        PRIMARY KEY (user_id, follower_id)
    )",
];

/// One tweet in the global feed, fully populated for the response contract.
/// Assembled with one join plus two batch fetches instead of per-tweet lookups.
#[derive(Debug, Clone)]
pub struct TweetFeedItem {
    pub id: i32,
    pub content: String,
    pub author_id: i32,
    pub author_name: String,
    pub likes: Vec<Like>,
    pub attachment_links: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TweetAuthorRow {
    id: i32,
    content: String,
    user_id: i32,
    author_name: String,
}

/// The sole component issuing transactional operations against the relational
/// store. Each method runs in its own transaction; the pool hands sessions out
/// per call and reclaims them on every exit path.
#[derive(Clone)]
pub struct Storage {
    pool: PgPool,
}

impl Storage {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected to database");
        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap, run once at startup.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        info!("Database schema initialized");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // --- users ---

    pub async fn insert_user(&self, name: &str, api_key: &str) -> Result<User, StorageError> {
        let (id,): (i32,) =
            sqlx::query_as("INSERT INTO users (name, api_key) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(api_key)
                .fetch_one(&self.pool)
                .await
                .map_err(map_constraint)?;
        Ok(User {
            id,
            name: name.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn user_by_api_key(&self, api_key: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as("SELECT id, name, api_key FROM users WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn user_by_id(&self, id: i32) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as("SELECT id, name, api_key FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, StorageError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let users =
            sqlx::query_as("SELECT id, name, api_key FROM users WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    // --- tweets ---

    pub async fn insert_tweet(&self, user_id: i32, content: &str) -> Result<i32, StorageError> {
        let (id,): (i32,) =
            sqlx::query_as("INSERT INTO tweets (content, user_id) VALUES ($1, $2) RETURNING id")
                .bind(content)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_constraint)?;
        debug!("Inserted tweet {} for user {}", id, user_id);
        Ok(id)
    }

    pub async fn tweet_by_id(&self, id: i32) -> Result<Option<Tweet>, StorageError> {
        let tweet = sqlx::query_as("SELECT id, content, user_id FROM tweets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tweet)
    }

    /// Deletes the tweet row; likes and attachments cascade at the store level.
    pub async fn delete_tweet(&self, id: i32) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("tweet {}", id)));
        }
        debug!("Deleted tweet {}", id);
        Ok(())
    }

    /// All tweets joined with their author, plus batch-fetched likes and
    /// attachment links.
    pub async fn list_tweet_feed(&self) -> Result<Vec<TweetFeedItem>, StorageError> {
        let rows: Vec<TweetAuthorRow> = sqlx::query_as(
            "SELECT t.id, t.content, t.user_id, u.name AS author_name
             FROM tweets t JOIN users u ON u.id = t.user_id
             ORDER BY t.id",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut likes_by_tweet: HashMap<i32, Vec<Like>> = HashMap::new();
        let mut links_by_tweet: HashMap<i32, Vec<String>> = HashMap::new();

        if !ids.is_empty() {
            let likes: Vec<Like> = sqlx::query_as(
                "SELECT tweet_id, user_id, name FROM likes WHERE tweet_id = ANY($1)",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
            for like in likes {
                likes_by_tweet.entry(like.tweet_id).or_default().push(like);
            }

            let attachments: Vec<Attachment> = sqlx::query_as(
                "SELECT id, tweet_id, file_name, link FROM attachments
                 WHERE tweet_id = ANY($1) ORDER BY id",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
            for attachment in attachments {
                if let (Some(tweet_id), Some(link)) = (attachment.tweet_id, attachment.link) {
                    links_by_tweet.entry(tweet_id).or_default().push(link);
                }
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| TweetFeedItem {
                likes: likes_by_tweet.remove(&row.id).unwrap_or_default(),
                attachment_links: links_by_tweet.remove(&row.id).unwrap_or_default(),
                id: row.id,
                content: row.content,
                author_id: row.user_id,
                author_name: row.author_name,
            })
            .collect())
    }

    // --- attachments ---

    /// Inserts an orphaned attachment, then fills in its file name and link in
    /// a second statement. The two statements commit separately: a crash in
    /// between leaves a row with a null file name, which later upload or
    /// cleanup tooling has to tolerate.
    pub async fn create_attachment(
        &self,
        original_file_name: &str,
    ) -> Result<Attachment, StorageError> {
        let (id,): (i32,) = sqlx::query_as("INSERT INTO attachments DEFAULT VALUES RETURNING id")
            .fetch_one(&self.pool)
            .await?;

        let file_name = attachment_file_name(id, original_file_name);
        let link = attachment_link(&file_name);
        sqlx::query("UPDATE attachments SET file_name = $1, link = $2 WHERE id = $3")
            .bind(&file_name)
            .bind(&link)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Created attachment {} ({})", id, file_name);
        Ok(Attachment {
            id,
            tweet_id: None,
            file_name: Some(file_name),
            link: Some(link),
        })
    }

    /// Bulk-sets the tweet reference on previously-orphaned attachments after
    /// the tweet row exists. Ids that match no attachment are silently skipped.
    pub async fn reassign_attachments_to_tweet(
        &self,
        attachment_ids: &[i32],
        tweet_id: i32,
    ) -> Result<(), StorageError> {
        if attachment_ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE attachments SET tweet_id = $1 WHERE id = ANY($2)")
            .bind(tweet_id)
            .bind(attachment_ids)
            .execute(&self.pool)
            .await
            .map_err(map_constraint)?;
        Ok(())
    }

    pub async fn attachments_by_tweet(
        &self,
        tweet_id: i32,
    ) -> Result<Vec<Attachment>, StorageError> {
        let attachments = sqlx::query_as(
            "SELECT id, tweet_id, file_name, link FROM attachments WHERE tweet_id = $1 ORDER BY id",
        )
        .bind(tweet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attachments)
    }

    // --- likes ---

    /// Inserts a like keyed by (tweet, user). A second like for the same pair
    /// is rejected by the primary key and surfaces as `ConstraintViolation`.
    pub async fn insert_like(
        &self,
        tweet_id: i32,
        user_id: i32,
        name: &str,
    ) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO likes (tweet_id, user_id, name) VALUES ($1, $2, $3)")
            .bind(tweet_id)
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_constraint)?;
        Ok(())
    }

    pub async fn like_by(&self, tweet_id: i32, user_id: i32) -> Result<Option<Like>, StorageError> {
        let like = sqlx::query_as(
            "SELECT tweet_id, user_id, name FROM likes WHERE tweet_id = $1 AND user_id = $2",
        )
        .bind(tweet_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(like)
    }

    pub async fn delete_like(&self, tweet_id: i32, user_id: i32) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM likes WHERE tweet_id = $1 AND user_id = $2")
            .bind(tweet_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- follow graph ---

    pub async fn follow_list_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<FollowList>, StorageError> {
        let list = sqlx::query_as("SELECT user_id, name FROM follow_lists WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(list)
    }

    pub async fn insert_follow_list(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<FollowList, StorageError> {
        sqlx::query("INSERT INTO follow_lists (user_id, name) VALUES ($1, $2)")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_constraint)?;
        Ok(FollowList {
            user_id,
            name: name.to_string(),
        })
    }

    pub async fn follow_edge(
        &self,
        followed_id: i32,
        follower_list_id: i32,
    ) -> Result<Option<FollowEdge>, StorageError> {
        let edge = sqlx::query_as(
            "SELECT user_id, follower_id FROM follow_edges
             WHERE user_id = $1 AND follower_id = $2",
        )
        .bind(followed_id)
        .bind(follower_list_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(edge)
    }

    pub async fn insert_follow_edge(
        &self,
        followed_id: i32,
        follower_list_id: i32,
    ) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO follow_edges (user_id, follower_id) VALUES ($1, $2)")
            .bind(followed_id)
            .bind(follower_list_id)
            .execute(&self.pool)
            .await
            .map_err(map_constraint)?;
        Ok(())
    }

    pub async fn delete_follow_edge(
        &self,
        followed_id: i32,
        follower_list_id: i32,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            "DELETE FROM follow_edges WHERE user_id = $1 AND follower_id = $2",
        )
        .bind(followed_id)
        .bind(follower_list_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "follow edge {} -> {}",
                followed_id, follower_list_id
            )));
        }
        Ok(())
    }

    /// Ids of users following `user_id` (incoming edges).
    pub async fn follower_ids_of(&self, user_id: i32) -> Result<Vec<i32>, StorageError> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT follower_id FROM follow_edges WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Ids of users the owner of follow list `follower_list_id` follows.
    pub async fn following_ids_of(&self, follower_list_id: i32) -> Result<Vec<i32>, StorageError> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT user_id FROM follow_edges WHERE follower_id = $1")
                .bind(follower_list_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
