//! Error types for network-facing components.
//!
//! Every failure of the token refresher, the resilient client, the catalog
//! lookup and the track picker ends up as an [`ApiError`]. The command-line
//! layer only renders them and decides between "try again" and "sign in again".

use thiserror::Error;

/// Configuration problems detected while reading the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid configuration in {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("cannot prepare data directory: {0}")]
    Io(String),
}

/// Classified failure of a call to one of the external services.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No access token was available when the call was made.
    #[error("no Spotify credential available, please sign in again")]
    CredentialMissing,

    /// The provider kept rejecting the token after every refresh attempt.
    #[error("Spotify rejected the session after {attempts} attempts, please sign in again")]
    AuthExpired { attempts: u32 },

    /// The refresh token could not be exchanged; the session is dead.
    #[error("your Spotify session could not be renewed, please sign in again")]
    RefreshFailed,

    /// Network failure or non-success response that survived all retries.
    #[error("request failed after {attempts} attempts: {message}")]
    Transient { attempts: u32, message: String },

    /// The service answered, but there was nothing to play.
    #[error("{0}")]
    UpstreamDataEmpty(String),

    /// A successful response did not have the expected shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Whether offering a manual "try again" makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::UpstreamDataEmpty(_))
    }

    /// Whether the only way forward is a fresh interactive login.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::CredentialMissing | Self::AuthExpired { .. } | Self::RefreshFailed
        )
    }
}
