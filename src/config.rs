//! Configuration management for the BoardGameGeek cache.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and collects them into a single [`Config`] value that is
//! passed explicitly into the API client, the snapshot stores and the batch
//! drivers. Nothing reads the environment after start-up.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{types::GameFetchMode, utils};

pub const DEFAULT_API_URL: &str = "https://boardgamegeek.com/xmlapi2";
pub const DEFAULT_BROWSE_URL: &str = "https://boardgamegeek.com/browse";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up under `bggcache/.env` inside the platform-specific
/// local data directory:
/// - Linux: `~/.local/share/bggcache/.env`
/// - macOS: `~/Library/Application Support/bggcache/.env`
/// - Windows: `%LOCALAPPDATA%/bggcache/.env`
///
/// A missing file is not an error; every setting has a default.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the `.env`
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = app_dir();
    path.push(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn app_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("bggcache");
    path
}

/// Runtime settings shared by every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the XML API, e.g. `https://boardgamegeek.com/xmlapi2`.
    pub api_url: String,
    /// Base URL of the public browse pages used for categories and mechanisms.
    pub browse_url: String,
    /// Root of all persisted snapshots and state files.
    pub data_dir: PathBuf,
    /// Bearer token for authenticated calls (collections, users).
    pub token: Option<String>,
    /// Number of ids requested per batch.
    pub batch_size: usize,
    /// Pause after each batch.
    pub batch_delay: Duration,
    /// Poll delay while an item request is queued (HTTP 202).
    pub item_queue_delay: Duration,
    /// Poll delay while a collection or user request is queued (HTTP 202).
    pub collection_queue_delay: Duration,
    /// Pause between single-item requests in probe mode.
    pub probe_delay: Duration,
    /// Number of table positions re-fetched per refresh run.
    pub refresh_window: usize,
    /// Added to the highest known id to form the next discovery guard.
    pub guard_headroom: u32,
    /// Guard used when no guard file exists yet.
    pub initial_guard: u32,
    /// Default snapshot age below which collections and buddies are reused.
    pub cutoff: chrono::Duration,
    pub fetch_mode: GameFetchMode,
}

impl Config {
    /// Default settings rooted at `data_dir`, without a token.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            browse_url: DEFAULT_BROWSE_URL.to_string(),
            data_dir,
            token: None,
            batch_size: 100,
            batch_delay: Duration::from_secs(4),
            item_queue_delay: Duration::from_secs(5),
            collection_queue_delay: Duration::from_secs(12),
            probe_delay: Duration::from_secs(1),
            refresh_window: 10_000,
            guard_headroom: 10_000,
            initial_guard: 10_000,
            cutoff: chrono::Duration::days(7),
            fetch_mode: GameFetchMode::Batch,
        }
    }

    /// Builds the configuration from environment variables and reads the token file.
    ///
    /// Recognised variables: `BGG_API_URL`, `BGG_BROWSE_URL`, `BGG_DATA_DIR`,
    /// `BGG_TOKEN_FILE`, `BGG_BATCH_SIZE`, `BGG_BATCH_DELAY_SECS`,
    /// `BGG_ITEM_QUEUE_DELAY_SECS`, `BGG_COLLECTION_QUEUE_DELAY_SECS`,
    /// `BGG_REFRESH_WINDOW`, `BGG_GUARD_HEADROOM`, `BGG_INITIAL_GUARD`,
    /// `BGG_CUTOFF_DAYS` and `BGG_FETCH_MODE` (`batch` or `probe`).
    pub async fn from_env() -> Result<Self, String> {
        let data_dir = env::var("BGG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_dir());
        let mut config = Self::new(data_dir);

        if let Ok(url) = env::var("BGG_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = env::var("BGG_BROWSE_URL") {
            config.browse_url = url.trim_end_matches('/').to_string();
        }

        config.batch_size = env_or("BGG_BATCH_SIZE", config.batch_size)?.max(1);
        config.batch_delay = Duration::from_secs(env_or("BGG_BATCH_DELAY_SECS", 4)?);
        config.item_queue_delay = Duration::from_secs(env_or("BGG_ITEM_QUEUE_DELAY_SECS", 5)?);
        config.collection_queue_delay =
            Duration::from_secs(env_or("BGG_COLLECTION_QUEUE_DELAY_SECS", 12)?);
        config.refresh_window = env_or("BGG_REFRESH_WINDOW", config.refresh_window)?.max(1);
        config.guard_headroom = env_or("BGG_GUARD_HEADROOM", config.guard_headroom)?;
        config.initial_guard = env_or("BGG_INITIAL_GUARD", config.initial_guard)?;
        config.cutoff = utils::cutoff_days(env_or("BGG_CUTOFF_DAYS", 7)?)
            .map_err(|e| format!("Invalid value for BGG_CUTOFF_DAYS: {}", e))?;
        config.fetch_mode = env_or("BGG_FETCH_MODE", config.fetch_mode)?;

        let token_file = env::var("BGG_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config.data_dir.join("tokens/bgg-token.txt"));
        config.token = read_token(&token_file).await;

        Ok(config)
    }

    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    pub fn buddies_dir(&self) -> PathBuf {
        self.data_dir.join("geekbuddies")
    }

    pub fn games_dir(&self) -> PathBuf {
        self.data_dir.join("games")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.games_dir().join("backups")
    }

    pub fn extra_dir(&self) -> PathBuf {
        self.data_dir.join("extra")
    }

    /// File holding the next discovery upper bound.
    pub fn guard_path(&self) -> PathBuf {
        self.data_dir.join("state/discovery_guard.txt")
    }

    /// File holding the start position of the next refresh window.
    pub fn cursor_path(&self) -> PathBuf {
        self.data_dir.join("state/refresh_cursor.txt")
    }
}

/// Reads the first line of the credentials file. `None` if absent or empty.
async fn read_token(path: &PathBuf) -> Option<String> {
    let content = async_fs::read_to_string(path).await.ok()?;
    let token = content.lines().next()?.trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid value for {}: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
