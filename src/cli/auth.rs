use std::time::Duration;

use crate::{
    error, management::TokenStore, session::SessionCoordinator, spotify, spotify::auth::TokenRefresher,
    success,
};

pub async fn auth() {
    let refresher = match TokenRefresher::from_env() {
        Ok(r) => r,
        Err(e) => error!("Cannot read Spotify credentials: {}", e),
    };
    let client_id = match crate::config::spotify_client_id() {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    };

    let state = super::server_state(refresher.clone());
    let pending = state.pending.clone();
    let server = super::spawn_server(state);

    let grant = match spotify::auth::login(pending, &client_id, Duration::from_secs(120)).await {
        Ok(grant) => grant,
        Err(e) => error!("{}", e),
    };
    server.abort();

    let coordinator = SessionCoordinator::new(refresher).with_store(TokenStore::default());
    coordinator.sign_in(grant).await;

    success!("Authentication successful!");
}
