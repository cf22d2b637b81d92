use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    config,
    error::ConfigError,
    types::{Grant, PendingLogin, Token, TokenError, TokenErrorResponse, TokenResponse},
    utils, warning,
};

/// Number of token exchanges attempted before a refresh is declared failed.
pub const MAX_REFRESH_ATTEMPTS: u32 = 3;

/// Client id/secret pair registered with Spotify.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            config::spotify_client_id()?,
            config::spotify_client_secret()?,
        ))
    }

    fn authorization(&self) -> String {
        utils::basic_auth_header(&self.client_id, &self.client_secret)
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Talks to the accounts service token endpoint.
///
/// [`TokenRefresher::refresh`] never fails: when every attempt is used up the
/// input token comes back marked with [`TokenError::RefreshFailed`] and callers
/// have to look at that field.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    http: Client,
    token_url: String,
    credentials: ClientCredentials,
    backoff_unit: Duration,
}

impl TokenRefresher {
    pub fn new(accounts_url: &str, credentials: ClientCredentials) -> Self {
        Self {
            http: Client::new(),
            token_url: format!("{}/api/token", accounts_url.trim_end_matches('/')),
            credentials,
            backoff_unit: Duration::from_secs(1),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config::spotify_accounts_url(),
            ClientCredentials::from_env()?,
        ))
    }

    /// Scales the `2^attempt` backoff. One second unless overridden.
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Exchanges the refresh token of `token` for a new access token.
    ///
    /// Failed attempts are retried after `2^attempt` backoff units, up to
    /// [`MAX_REFRESH_ATTEMPTS`] attempts in total. If Spotify rotates the
    /// refresh token the new one is kept, otherwise the old one stays. A
    /// response whose `expires_in` is negative or out of range counts as a
    /// failed attempt.
    pub async fn refresh(&self, token: &Token) -> Token {
        if token.refresh_token.is_empty() {
            warning!("Cannot refresh session: no refresh token stored");
            return Self::failed(token);
        }

        for attempt in 1..=MAX_REFRESH_ATTEMPTS {
            let outcome = self
                .request_refresh(&token.refresh_token)
                .await
                .and_then(|response| {
                    let expires_at = utils::expiry_after(Utc::now(), response.expires_in)
                        .ok_or_else(|| {
                            format!("expires_in out of range: {}", response.expires_in)
                        })?;
                    Ok(Token {
                        access_token: response.access_token,
                        refresh_token: response
                            .refresh_token
                            .filter(|t| !t.is_empty())
                            .unwrap_or_else(|| token.refresh_token.clone()),
                        expires_at,
                        error: None,
                    })
                });

            match outcome {
                Ok(refreshed) => return refreshed,
                Err(reason) => {
                    warning!(
                        "Token refresh attempt {}/{} failed: {}",
                        attempt,
                        MAX_REFRESH_ATTEMPTS,
                        reason
                    );
                    if attempt < MAX_REFRESH_ATTEMPTS {
                        tokio::time::sleep(utils::refresh_backoff(attempt, self.backoff_unit))
                            .await;
                    }
                }
            }
        }

        Self::failed(token)
    }

    /// Exchanges an authorization code from the `/callback` redirect for the
    /// initial token pair.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<Grant, String> {
        let response = self
            .post(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("code_verifier", verifier),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        let refresh_token = response
            .refresh_token
            .ok_or_else(|| "token response carries no refresh token".to_string())?;

        Grant::from_expires_in(response.access_token, refresh_token, response.expires_in)
            .ok_or_else(|| format!("expires_in out of range: {}", response.expires_in))
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenResponse, String> {
        self.post(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn post(&self, form: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let res = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.authorization())
            .form(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = res.status();
        let body = res.text().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            let description = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| "Failed to refresh token".to_string());
            return Err(format!("{}: {}", status, description));
        }

        serde_json::from_str(&body).map_err(|e| e.to_string())
    }

    fn failed(token: &Token) -> Token {
        Token {
            error: Some(TokenError::RefreshFailed),
            ..token.clone()
        }
    }
}

/// Builds the URL of the Spotify consent page for a PKCE login.
pub fn authorize_url(
    accounts_url: &str,
    client_id: &str,
    redirect_uri: &str,
    code_challenge: &str,
) -> Result<Url, String> {
    let scope = config::spotify_scope();
    Url::parse_with_params(
        &format!("{}/authorize", accounts_url.trim_end_matches('/')),
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", scope.as_str()),
        ],
    )
    .map_err(|e| e.to_string())
}

/// Runs the interactive login and returns the resulting grant.
///
/// 1. **PKCE Setup**: generates the code verifier and its S256 challenge
/// 2. **Pending state**: stores the verifier where the `/callback` handler finds it
/// 3. **Browser Launch**: opens the consent page, or prints it when no browser is available
/// 4. **Wait**: polls the shared state until the callback stored a grant
///
/// The local server answering `/callback` has to be running already.
pub async fn login(
    shared_state: Arc<Mutex<Option<PendingLogin>>>,
    client_id: &str,
    max_wait: Duration,
) -> Result<Grant, String> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let url = authorize_url(
        &config::spotify_accounts_url(),
        client_id,
        &config::spotify_redirect_uri(),
        &code_challenge,
    )?;

    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PendingLogin {
            code_verifier,
            grant: None,
        });
    }

    if webbrowser::open(url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        )
    }

    wait_for_grant(shared_state, max_wait)
        .await
        .ok_or_else(|| "Authentication failed or timed out.".to_string())
}

async fn wait_for_grant(
    shared_state: Arc<Mutex<Option<PendingLogin>>>,
    max_wait: Duration,
) -> Option<Grant> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = shared_state.lock().await;
            if let Some(grant) = lock.as_ref().and_then(|p| p.grant.clone()) {
                return Some(grant);
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}
