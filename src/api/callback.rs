use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{config, spotify::auth::TokenRefresher, types::PendingLogin, warning};

/// Receives the redirect from the Spotify consent page and trades the
/// authorization code for the initial grant.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(pending): Extension<Arc<Mutex<Option<PendingLogin>>>>,
    Extension(refresher): Extension<Arc<TokenRefresher>>,
) -> Html<&'static str> {
    if let Some(reason) = params.get("error") {
        warning!("Spotify login was not completed: {}", reason);
        return Html("<h4>Login cancelled.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = pending.lock().await;
    let Some(login) = state.as_mut() else {
        return Html("<h4>No login in progress.</h4>");
    };

    match refresher
        .exchange_code(code, &login.code_verifier, &config::spotify_redirect_uri())
        .await
    {
        Ok(grant) => {
            login.grant = Some(grant);
            Html("<h2>Signed in.</h2><p>You can close this window and start guessing.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
