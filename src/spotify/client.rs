use std::{sync::Arc, time::Duration};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::ApiError,
    session::{SessionRefreshRequester, SessionSource},
    types::Session,
    utils, warning,
};

/// Retries allowed after the initial attempt of one call.
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Unit of the linear backoff used for everything but a refreshed token.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
enum Failure {
    Unauthorized,
    Status(StatusCode, String),
    Network(String),
}

impl Failure {
    fn exhausted(self, attempts: u32) -> ApiError {
        match self {
            Failure::Unauthorized => ApiError::AuthExpired { attempts },
            Failure::Status(status, message) => ApiError::Transient {
                attempts,
                message: format!("{}: {}", status, message),
            },
            Failure::Network(message) => ApiError::Transient { attempts, message },
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Unauthorized => write!(f, "access token rejected"),
            Failure::Status(status, message) => write!(f, "{}: {}", status, message),
            Failure::Network(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Deserialize)]
struct SpotifyErrorBody {
    error: SpotifyErrorDetail,
}

#[derive(Deserialize)]
struct SpotifyErrorDetail {
    message: Option<String>,
}

/// GET-only client for the Spotify Web API that survives token expiry.
///
/// On a 401 the client asks the session owner for a refresh, waits for it and
/// retries with the token the session holds afterwards. Other failures are
/// retried with the same token after a linear backoff. Only idempotent reads go
/// through here, so repeating a request is always safe.
#[derive(Clone)]
pub struct ResilientClient {
    http: Client,
    base_url: String,
    requester: Arc<dyn SessionRefreshRequester>,
    source: Arc<dyn SessionSource>,
    policy: RetryPolicy,
}

impl ResilientClient {
    pub fn new(
        base_url: &str,
        requester: Arc<dyn SessionRefreshRequester>,
        source: Arc<dyn SessionSource>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            requester,
            source,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves `path` against the API base URL. Absolute URLs, such as the
    /// `next` links of paging objects, are returned unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Starts a new operation with the token currently held by the session.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = Self::usable_token(self.source.current_session().await)?;
        self.request(&self.url(path), &token).await
    }

    /// Issues `GET url` with `access_token`, retrying as described on the type.
    ///
    /// The attempt counter lives in this call only; concurrent calls never see
    /// each other's retries.
    pub async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, ApiError> {
        if access_token.is_empty() {
            return Err(ApiError::CredentialMissing);
        }

        let mut token = access_token.to_string();
        let mut attempt: u32 = 0;

        loop {
            let failure = match self.send(url, &token).await {
                Ok(body) => {
                    return serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                        url: url.to_string(),
                        source,
                    });
                }
                Err(failure) => failure,
            };

            if attempt >= self.policy.max_retries {
                return Err(failure.exhausted(attempt + 1));
            }

            if let Failure::Unauthorized = failure {
                self.requester.request_refresh().await;
                let refreshed = Self::usable_token(self.source.current_session().await)?;
                if refreshed != token {
                    token = refreshed;
                    attempt += 1;
                    continue;
                }
            }

            let delay = utils::linear_backoff(self.policy.base_delay, attempt);
            warning!(
                "Request to {} failed ({}), retrying in {} ms",
                url,
                failure,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send(&self, url: &str, token: &str) -> Result<String, Failure> {
        let res = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Failure::Network(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Failure::Unauthorized);
        }

        let body = res
            .text()
            .await
            .map_err(|e| Failure::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<SpotifyErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(Failure::Status(status, message));
        }

        Ok(body)
    }

    fn usable_token(session: Session) -> Result<String, ApiError> {
        if session.error.is_some() {
            return Err(ApiError::RefreshFailed);
        }
        session
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::CredentialMissing)
    }
}
