//! # Session Module
//!
//! Owns the Spotify token for the lifetime of a game and decides when it has to
//! be renewed.
//!
//! ```text
//! Resilient client ──401──▶ SessionRefreshRequester ──▶ SessionCoordinator ──▶ TokenRefresher
//!        ▲                                                     │
//!        └──────────────── SessionSource (re-read) ◀───────────┘
//! ```
//!
//! Code deep inside the application never holds the coordinator directly. It is
//! given two capabilities instead:
//!
//! - [`SessionRefreshRequester`] - "please refresh the session now", resolved
//!   once the owner has finished (or the wait bound elapsed)
//! - [`SessionSource`] - read the current [`Session`]
//!
//! The coordinator implements both. [`SessionRefreshBus`] implements the
//! requester for setups where the session owner only listens for signals.

mod bus;
mod coordinator;

use async_trait::async_trait;

pub use bus::{RefreshSignal, SessionRefreshBus};
pub use coordinator::{SessionCoordinator, SessionState, classify};

use crate::types::Session;

/// Capability to ask the session owner for a refresh.
#[async_trait]
pub trait SessionRefreshRequester: Send + Sync {
    /// Returns once the refresh has completed or the owner did not answer in time.
    async fn request_refresh(&self);
}

/// Capability to read the current session.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn current_session(&self) -> Session;
}
