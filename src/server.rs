use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, catalog::CatalogProxy, spotify::auth::TokenRefresher, types::PendingLogin};

/// Collaborators shared by the handlers.
#[derive(Clone)]
pub struct ServerState {
    pub pending: Arc<Mutex<Option<PendingLogin>>>,
    pub refresher: Arc<TokenRefresher>,
    pub catalog: Arc<CatalogProxy>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .route("/api/search", get(api::search))
        .layer(Extension(state.pending))
        .layer(Extension(state.refresher))
        .layer(Extension(state.catalog))
}

pub async fn start_api_server(addr: &str, state: ServerState) -> Result<(), String> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| format!("Failed to parse server address {}: {}", addr, e))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    axum::serve(listener, router(state))
        .await
        .map_err(|e| e.to_string())
}
