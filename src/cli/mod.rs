//! # CLI Module
//!
//! User-facing commands. Each command wires the library components together,
//! shows progress and turns errors into messages the player can act on.
//!
//! ## Commands
//!
//! - [`auth`] - sign in with Spotify (PKCE + local callback server)
//! - [`profile`] - show the signed-in user
//! - [`playlists`] - list the playlists tracks are drawn from
//! - [`playlist`] - show the tracks of one playlist
//! - [`play`] - draw a track, fetch its preview and take a guess
//! - [`serve`] - run the local server (callback + catalog proxy) in the foreground
//!
//! ## Session wiring
//!
//! ```text
//! ResilientClient ──publish──▶ SessionRefreshBus ──signal──▶ SessionCoordinator (listener)
//!        ▲                                                          │
//!        └────────────────────── current_session ◀──────────────────┘
//! ```
//!
//! The coordinator is restored from the token store; the client only knows the
//! bus and the coordinator's read side.
//!
//! ## Usage Patterns
//!
//! ```bash
//! guessthebeat auth          # Sign in once
//! guessthebeat play          # Guess a random track from your playlists
//! guessthebeat playlists     # See where tracks come from
//! guessthebeat playlist <id> # Tracks of one playlist
//! ```

mod auth;
mod play;
mod playlist;
mod playlists;
mod profile;
mod serve;

use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    catalog::CatalogProxy,
    config, error,
    error::ApiError,
    management::TokenStore,
    server::{self, ServerState},
    session::{SessionCoordinator, SessionRefreshBus},
    spotify::{auth::TokenRefresher, client::ResilientClient},
    warning,
};

pub use auth::auth;
pub use play::play;
pub use playlist::playlist;
pub use playlists::playlists;
pub use profile::profile;
pub use serve::serve;

/// Upper bound for a refresh requested over the bus.
const REFRESH_WAIT: Duration = Duration::from_secs(1);

pub(crate) struct Connection {
    pub client: ResilientClient,
    _listener: JoinHandle<()>,
}

/// Restores the stored session and builds a client on top of it.
pub(crate) async fn connect() -> Connection {
    let refresher = match TokenRefresher::from_env() {
        Ok(r) => r,
        Err(e) => error!("Cannot read Spotify credentials: {}", e),
    };

    let coordinator = match SessionCoordinator::restore(refresher, TokenStore::default()).await {
        Ok(c) => Arc::new(c),
        Err(e) => error!(
            "Failed to load token. Please run guessthebeat auth\n Error: {}",
            e
        ),
    };

    let bus = Arc::new(SessionRefreshBus::new(REFRESH_WAIT));
    let listener = Arc::clone(&coordinator).listen(Arc::clone(&bus));
    let client = ResilientClient::new(&config::spotify_api_url(), bus, coordinator);

    Connection {
        client,
        _listener: listener,
    }
}

pub(crate) fn server_state(refresher: TokenRefresher) -> ServerState {
    ServerState {
        pending: Arc::new(Mutex::new(None)),
        refresher: Arc::new(refresher),
        catalog: Arc::new(CatalogProxy::from_env()),
    }
}

/// Runs the local server in the background. A failure to bind is only reported,
/// another instance may already be serving.
pub(crate) fn spawn_server(state: ServerState) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = server::start_api_server(&config::server_addr(), state).await {
            warning!("Local server not started: {}", e);
        }
    })
}

/// Prints `err` and exits, pointing to `auth` when a new login is needed.
pub(crate) fn fail(err: ApiError) -> ! {
    if err.requires_login() {
        error!("{}\nRun guessthebeat auth to sign in.", err);
    }
    if err.is_retryable() {
        error!("{}\nPlease try again.", err);
    }
    error!("{}", err)
}
