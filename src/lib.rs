//! guessthebeat library
//!
//! Backend for a music guessing game: the player signs in with Spotify, a random
//! track is drawn from their playlists, a short audio preview is looked up on
//! Deezer and the player tries to name the song.
//!
//! Most of the interesting logic lives in the session layer. Access tokens expire
//! while a game is running, so every call to the Spotify Web API goes through a
//! client that notices a rejected token, asks the session owner for a refresh and
//! retries with whatever token the session holds afterwards.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local server (OAuth callback, catalog proxy)
//! - `catalog` - Deezer preview lookup through the local proxy
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by all network-facing components
//! - `game` - Random track selection
//! - `management` - On-disk credential store
//! - `server` - Local HTTP server
//! - `session` - Session coordinator and the refresh signal bus
//! - `spotify` - Spotify Web API client, token refresher and login flow
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod game;
pub mod management;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Drawing a track from {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for the command-line layer. Library code returns errors instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable conditions such as a retried request or a refresh that
/// has to be attempted again.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
