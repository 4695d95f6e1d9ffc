use std::path::PathBuf;

use crate::config::AppConfig;
use crate::db::storage::Storage;

/// Shared per-request dependencies, cloned into every handler by axum.
/// The storage gateway is passed explicitly instead of living in a global.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub media_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl AppState {
    pub fn new(storage: Storage, config: &AppConfig) -> Self {
        Self {
            storage,
            media_dir: PathBuf::from(&config.media_dir),
            templates_dir: PathBuf::from(&config.templates_dir),
        }
    }

    /// Directory uploaded images are written to; mirrored by attachment links.
    pub fn images_dir(&self) -> PathBuf {
        self.media_dir.join("images")
    }
}
