//! # Spotify Integration Module
//!
//! Everything that talks to Spotify: the accounts service (login and token
//! refresh) and the Web API (playlists, tracks, profile).
//!
//! ```text
//! game / cli
//!     ↓
//! playlists, profile        typed endpoint wrappers
//!     ↓
//! client::ResilientClient   401 → refresh → retry, linear backoff otherwise
//!     ↓
//! reqwest
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - PKCE login, authorization code exchange and [`auth::TokenRefresher`]
//! - [`client`] - [`client::ResilientClient`], the only way the Web API is called
//! - [`playlists`] - the user's playlists and their tracks, with pagination
//! - [`profile`] - the signed-in user
//!
//! ## API Coverage
//!
//! - `GET /me`
//! - `GET /me/playlists`
//! - `GET /playlists/{playlist_id}/tracks`
//! - `POST /api/token` (accounts service)
//!
//! ## Error Types
//!
//! Web API calls return [`crate::error::ApiError`]. The token refresher never
//! fails; it marks the token instead (see [`crate::types::TokenError`]).

pub mod auth;
pub mod client;
pub mod playlists;
pub mod profile;
