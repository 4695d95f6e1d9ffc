#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use chirp_api::db::models::User;
use chirp_api::db::storage::Storage;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static SEED_COUNTER: AtomicU32 = AtomicU32::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    /// Media directory the spawned server writes uploads into.
    pub media_dir: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let media_dir = std::env::temp_dir().join(format!("chirp-api-test-{}", port));
        std::fs::create_dir_all(&media_dir)?;

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/chirp-api");
        cmd.env("CHIRP_PORT", port.to_string())
            .env("MEDIA_DIR", &media_dir)
            .env("TEMPLATES_DIR", media_dir.join("templates"))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            media_dir,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// True when a database is reachable via DATABASE_URL (possibly from .env).
pub fn database_configured() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").is_ok()
}

/// Spawned shared server, or None when no database is configured (tests skip).
pub async fn server_if_db() -> Result<Option<&'static TestServer>> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(None);
    }
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Direct storage handle for seeding and assertions behind the API's back.
pub async fn storage() -> Result<Storage> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let storage = Storage::connect(&url, 2).await?;
    storage.migrate().await?;
    Ok(storage)
}

/// Creates a user with a process-unique API key.
pub async fn seed_user(storage: &Storage, name: &str) -> Result<User> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let n = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    let api_key = format!("key-{}-{}-{}", std::process::id(), nanos, n);
    Ok(storage.insert_user(name, &api_key).await?)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}
