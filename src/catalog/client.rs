use reqwest::Client;
use serde::Deserialize;

use crate::{
    config,
    error::ApiError,
    types::{CatalogSearchResponse, CatalogTrack},
};

#[derive(Deserialize)]
struct ProxyError {
    error: String,
}

/// Client of the catalog search proxy.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(&config::catalog_proxy_url())
    }

    /// Searches the catalog for `song_name`.
    pub async fn search(&self, song_name: &str) -> Result<Vec<CatalogTrack>, ApiError> {
        let transient = |message: String| ApiError::Transient {
            attempts: 1,
            message,
        };

        let res = self
            .http
            .get(format!("{}/api/search", self.base_url))
            .query(&[("songName", song_name)])
            .send()
            .await
            .map_err(|e| transient(e.to_string()))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| transient(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProxyError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(transient(message));
        }

        let parsed: CatalogSearchResponse =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                url: format!("{}/api/search", self.base_url),
                source,
            })?;
        Ok(parsed.tracks)
    }

    /// Preview URL of the best match for `song_name`.
    pub async fn find_preview(&self, song_name: &str) -> Result<String, ApiError> {
        self.search(song_name)
            .await?
            .into_iter()
            .map(|track| track.preview)
            .find(|preview| !preview.is_empty())
            .ok_or_else(|| {
                ApiError::UpstreamDataEmpty(format!("No preview found for \"{}\"", song_name))
            })
    }
}
