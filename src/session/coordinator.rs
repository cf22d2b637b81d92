use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::{
    sync::{Mutex, broadcast::error::RecvError},
    task::JoinHandle,
};

use super::{SessionRefreshBus, SessionRefreshRequester, SessionSource};
use crate::{
    management::TokenStore,
    spotify::auth::TokenRefresher,
    types::{Grant, Session, Token},
    warning,
};

/// Where a token stands when the session is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A new grant from an interactive login is waiting to be adopted.
    FreshGrant,
    /// The access token is past its expiry and must be refreshed.
    Expired,
    /// The access token can be used as is.
    Valid,
    /// A refresh failed for good; only a new login gets out of here.
    Errored,
    /// Nothing to work with.
    SignedOut,
}

/// Decides the state of the session for one read.
///
/// An errored token stays errored even when asked to refresh; a grant always
/// wins since it comes from a new login.
pub fn classify(
    token: Option<&Token>,
    has_grant: bool,
    force_refresh: bool,
    now: DateTime<Utc>,
) -> SessionState {
    if has_grant {
        return SessionState::FreshGrant;
    }

    match token {
        None => SessionState::SignedOut,
        Some(t) if t.is_errored() => SessionState::Errored,
        Some(t) if force_refresh || t.is_expired_at(now) => SessionState::Expired,
        Some(_) => SessionState::Valid,
    }
}

/// Single owner of the token.
///
/// Every read goes through [`classify`]; refreshes happen while the token lock
/// is held, so concurrent readers wait for the new token instead of starting a
/// refresh of their own.
pub struct SessionCoordinator {
    token: Mutex<Option<Token>>,
    refresher: TokenRefresher,
    store: Option<TokenStore>,
}

impl SessionCoordinator {
    pub fn new(refresher: TokenRefresher) -> Self {
        Self {
            token: Mutex::new(None),
            refresher,
            store: None,
        }
    }

    /// Persists the token to `store` after every change.
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Resumes a session from a previously stored token.
    pub fn with_token(self, token: Token) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            ..self
        }
    }

    /// Restores the session held by `store`, if any, and keeps persisting to it.
    pub async fn restore(refresher: TokenRefresher, store: TokenStore) -> Result<Self, String> {
        let token = store.load().await?;
        Ok(Self::new(refresher).with_store(store).with_token(token))
    }

    /// Adopts the tokens of an interactive login.
    pub async fn sign_in(&self, grant: Grant) -> Session {
        self.resolve(Some(grant), false).await
    }

    /// Returns the current session, refreshing an expired token first.
    pub async fn session(&self) -> Session {
        self.resolve(None, false).await
    }

    /// Re-evaluates the session. With `force` the token is refreshed even if it
    /// has not reached its expiry, which is what a rejected token calls for.
    pub async fn update(&self, force: bool) -> Session {
        self.resolve(None, force).await
    }

    pub async fn sign_out(&self) {
        self.token.lock().await.take();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear().await {
                warning!("Failed to remove stored token: {}", e);
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        let slot = self.token.lock().await;
        classify(slot.as_ref(), false, false, Utc::now())
    }

    /// Spawns the task that answers refresh signals published on `bus`.
    ///
    /// The subscription is taken before this returns, so no signal published
    /// afterwards is missed.
    pub fn listen(self: Arc<Self>, bus: Arc<SessionRefreshBus>) -> JoinHandle<()> {
        let mut signals = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(signal) => {
                        self.update(true).await;
                        bus.acknowledge(signal.seq);
                    }
                    Err(RecvError::Lagged(_)) => {
                        self.update(true).await;
                        bus.acknowledge(bus.last_published());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn resolve(&self, grant: Option<Grant>, force: bool) -> Session {
        let mut slot = self.token.lock().await;

        let next = match classify(slot.as_ref(), grant.is_some(), force, Utc::now()) {
            SessionState::FreshGrant => grant.map(Token::from),
            SessionState::Expired => match slot.as_ref() {
                Some(current) => Some(self.refresher.refresh(current).await),
                None => None,
            },
            SessionState::Valid | SessionState::Errored => {
                return slot.as_ref().map(Session::from).unwrap_or_default();
            }
            SessionState::SignedOut => return Session::default(),
        };

        if let (Some(token), Some(store)) = (next.as_ref(), &self.store) {
            if let Err(e) = store.persist(token).await {
                warning!("Failed to save token to cache: {}", e);
            }
        }

        *slot = next;
        slot.as_ref().map(Session::from).unwrap_or_default()
    }
}

#[async_trait]
impl SessionRefreshRequester for SessionCoordinator {
    async fn request_refresh(&self) {
        self.update(true).await;
    }
}

#[async_trait]
impl SessionSource for SessionCoordinator {
    async fn current_session(&self) -> Session {
        self.session().await
    }
}
