//! # API Module
//!
//! HTTP handlers of the local server.
//!
//! ## Endpoints
//!
//! - [`callback`] - `GET /callback`, end of the Spotify login; exchanges the
//!   authorization code and hands the grant to the waiting login flow
//! - [`search`] - `GET /api/search?songName=`, catalog proxy used to find audio
//!   previews
//! - [`health`] - `GET /health`, status and version
//!
//! Handlers receive their collaborators through axum [`axum::Extension`]
//! layers set up in [`crate::server::router`].
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use guessthebeat::api::{callback, health, search};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/api/search", get(search))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;
mod search;

pub use callback::callback;
pub use health::health;
pub use search::search;
