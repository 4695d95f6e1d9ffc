use anyhow::Context;
use axum::{
    extract::State,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use std::path::Path;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use chirp_api::config::{self, AppConfig};
use chirp_api::db::storage::Storage;
use chirp_api::handlers;
use chirp_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, MEDIA_DIR, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    anyhow::ensure!(!config.database_url.is_empty(), "DATABASE_URL is not set");

    let storage = Storage::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to database")?;
    storage.migrate().await.context("failed to initialize schema")?;

    let state = AppState::new(storage, config);
    std::fs::create_dir_all(state.images_dir())
        .with_context(|| format!("failed to create {}", state.images_dir().display()))?;

    let app = app(state, config);

    // Allow tests or deployments to override port via env
    let port = std::env::var("CHIRP_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("chirp-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api_routes())
        .merge(web_routes(config))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use handlers::{follows, likes, medias, tweets, users};

    Router::new()
        .route(
            "/api/tweets",
            get(tweets::list_tweets).post(tweets::create_tweet),
        )
        .route("/api/tweets/:id", delete(tweets::delete_tweet))
        .route(
            "/api/tweets/:id/likes",
            post(likes::add_like).delete(likes::remove_like),
        )
        .route("/api/medias", post(medias::upload_media))
        .route(
            "/api/users/:id/follow",
            post(follows::follow_user).delete(follows::unfollow_user),
        )
        .route("/api/users/me", get(users::get_me))
        .route("/api/users/:id", get(users::get_profile))
}

/// Browser-facing glue: the single-page frontend plus static media.
fn web_routes(config: &AppConfig) -> Router<AppState> {
    let templates = Path::new(&config.templates_dir);
    let media = Path::new(&config.media_dir);
    let index = ServeFile::new(templates.join("index.html"));

    Router::new()
        .route_service("/", index.clone())
        .route_service("/login", index.clone())
        .nest_service("/profile", index)
        .route_service("/favicon.ico", ServeFile::new(media.join("favicon.ico")))
        .nest_service("/images", ServeDir::new(media.join("images")))
        .nest_service("/static", ServeDir::new(templates.join("static")))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.storage.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "result": true,
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "result": false,
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
