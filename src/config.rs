//! Configuration management for guessthebeat.
//!
//! Values come from environment variables, optionally seeded from a `.env` file
//! in the local data directory. The client id and secret are required; every
//! URL has a default pointing at the public services.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3001";
pub const DEFAULT_DEEZER_API_URL: &str = "https://api.deezer.com";

/// Scopes requested during the interactive login.
pub const REQUIRED_SCOPES: &[&str] = &[
    "streaming",
    "user-read-email",
    "playlist-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
];

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates `<data_local_dir>/guessthebeat/` if needed. A missing `.env` file is
/// not an error since all values may also be provided by the process
/// environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/guessthebeat/.env`
/// - macOS: `~/Library/Application Support/guessthebeat/.env`
/// - Windows: `%LOCALAPPDATA%/guessthebeat/.env`
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Io(e.to_string()))?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(_)) => Ok(()),
        Err(e) => Err(ConfigError::Invalid {
            name: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Root of everything the game keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("guessthebeat");
    path
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Returns the Spotify client ID (`SPOTIFY_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify client secret (`SPOTIFY_CLIENT_SECRET`).
///
/// # Security Note
///
/// The secret is only ever sent inside the Basic authorization header of token
/// requests and must never be logged.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// Returns the OAuth redirect URI (`SPOTIFY_REDIRECT_URI`).
///
/// Defaults to the `/callback` route of the local server.
pub fn spotify_redirect_uri() -> String {
    with_default(
        "SPOTIFY_REDIRECT_URI",
        &format!("http://{}/callback", server_addr()),
    )
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_api_url() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
}

/// Returns the Spotify accounts service base URL (`SPOTIFY_ACCOUNTS_URL`).
///
/// Both the authorize page and the token endpoint hang off this URL.
pub fn spotify_accounts_url() -> String {
    with_default("SPOTIFY_ACCOUNTS_URL", DEFAULT_SPOTIFY_ACCOUNTS_URL)
}

/// Returns the bind address of the local server (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the base URL of the catalog search proxy (`CATALOG_PROXY_URL`).
pub fn catalog_proxy_url() -> String {
    with_default("CATALOG_PROXY_URL", &format!("http://{}", server_addr()))
}

/// Returns the public Deezer API base URL (`DEEZER_API_URL`).
pub fn deezer_api_url() -> String {
    with_default("DEEZER_API_URL", DEFAULT_DEEZER_API_URL)
}

/// Space separated scope string for the authorize request.
pub fn spotify_scope() -> String {
    REQUIRED_SCOPES.join(" ")
}
