use once_cell::sync::Lazy;
use std::env;

/// Application configuration, loaded once from the environment.
///
/// `dotenvy::dotenv()` runs in `main` before the first access, so a local
/// `.env` file can supply any of these.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbose request/SQL logging when true.
    pub debug_mode: bool,
    /// Directory holding uploaded images (under `{media_dir}/images`) and the favicon.
    pub media_dir: String,
    /// Directory holding the browser-facing `index.html` and static assets.
    pub templates_dir: String,
    /// Postgres connection string.
    pub database_url: String,
    /// Connection pool size.
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            debug_mode: env::var("DEBUG_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
            templates_dir: env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string()),
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
