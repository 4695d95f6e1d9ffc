mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn post_tweet(base_url: &str, api_key: &str, content: &str) -> Result<i32> {
    let res = common::client()
        .post(format!("{}/api/tweets", base_url))
        .header("api-key", api_key)
        .json(&json!({"tweet_data": content, "tweet_media_ids": []}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["result"], true);
    Ok(body["id"].as_i64().unwrap() as i32)
}

async fn feed_tweet(base_url: &str, api_key: &str, tweet_id: i32) -> Result<Option<Value>> {
    let res = common::client()
        .get(format!("{}/api/tweets", base_url))
        .header("api-key", api_key)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["result"], true);
    Ok(body["tweets"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == tweet_id)
        .cloned())
}

#[tokio::test]
async fn feed_shows_tweet_with_author_and_likes() -> Result<()> {
    let Some(server) = common::server_if_db().await? else {
        return Ok(());
    };
    let storage = common::storage().await?;
    let a = common::seed_user(&storage, "alice").await?;
    let b = common::seed_user(&storage, "bob").await?;

    let tweet_id = post_tweet(&server.base_url, &a.api_key, "hello").await?;

    let res = common::client()
        .post(format!("{}/api/tweets/{}/likes", server.base_url, tweet_id))
        .header("api-key", &b.api_key)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let tweet = feed_tweet(&server.base_url, &a.api_key, tweet_id)
        .await?
        .expect("tweet missing from feed");
    assert_eq!(tweet["content"], "hello");
    assert_eq!(tweet["author"], json!({"id": a.id, "name": "alice"}));
    assert_eq!(tweet["likes"], json!([{"user_id": b.id, "name": "bob"}]));
    assert!(tweet["attachments"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_foreign_tweet_is_forbidden() -> Result<()> {
    let Some(server) = common::server_if_db().await? else {
        return Ok(());
    };
    let storage = common::storage().await?;
    let a = common::seed_user(&storage, "alice").await?;
    let b = common::seed_user(&storage, "bob").await?;

    let tweet_id = post_tweet(&server.base_url, &a.api_key, "mine").await?;

    let res = common::client()
        .delete(format!("{}/api/tweets/{}", server.base_url, tweet_id))
        .header("api-key", &b.api_key)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error_type"], "Forbidden");
    assert_eq!(body["error_message"], "Tweet author is not user");

    // The tweet must be intact
    assert!(storage.tweet_by_id(tweet_id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn deleting_missing_tweet_is_not_found() -> Result<()> {
    let Some(server) = common::server_if_db().await? else {
        return Ok(());
    };
    let storage = common::storage().await?;
    let a = common::seed_user(&storage, "alice").await?;

    let res = common::client()
        .delete(format!("{}/api/tweets/999999999", server.base_url))
        .header("api-key", &a.api_key)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error_message"], "Not found tweet by id");
    Ok(())
}

#[tokio::test]
async fn deleting_a_tweet_cascades_to_likes_and_attachments() -> Result<()> {
    let Some(server) = common::server_if_db().await? else {
        return Ok(());
    };
    let storage = common::storage().await?;
    let a = common::seed_user(&storage, "alice").await?;
    let b = common::seed_user(&storage, "bob").await?;

    let tweet_id = post_tweet(&server.base_url, &a.api_key, "goodbye").await?;

    // Two likes from different users
    for user in [&a, &b] {
        let res = common::client()
            .post(format!("{}/api/tweets/{}/likes", server.base_url, tweet_id))
            .header("api-key", &user.api_key)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // One attachment with its backing file on disk
    let attachment = storage.create_attachment("pic.png").await?;
    storage
        .reassign_attachments_to_tweet(&[attachment.id], tweet_id)
        .await?;
    let file_path = server
        .media_dir
        .join("images")
        .join(attachment.file_name.as_deref().unwrap());
    std::fs::write(&file_path, b"png-bytes")?;

    let res = common::client()
        .delete(format!("{}/api/tweets/{}", server.base_url, tweet_id))
        .header("api-key", &a.api_key)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Zero residual rows referencing the tweet, and the file is gone
    assert!(storage.tweet_by_id(tweet_id).await?.is_none());
    assert!(storage.like_by(tweet_id, a.id).await?.is_none());
    assert!(storage.like_by(tweet_id, b.id).await?.is_none());
    assert!(storage.attachments_by_tweet(tweet_id).await?.is_empty());
    assert!(!file_path.exists());
    Ok(())
}
