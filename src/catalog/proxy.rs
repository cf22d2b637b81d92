use reqwest::Client;

use crate::{
    config,
    types::{CatalogTrack, DeezerSearchResponse},
};

/// Server side of the catalog search: forwards a query to Deezer and reshapes
/// the answer.
#[derive(Debug, Clone)]
pub struct CatalogProxy {
    http: Client,
    deezer_url: String,
}

impl CatalogProxy {
    pub fn new(deezer_url: &str) -> Self {
        Self {
            http: Client::new(),
            deezer_url: deezer_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(&config::deezer_api_url())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CatalogTrack>, String> {
        let res = self
            .http
            .get(format!("{}/search", self.deezer_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            return Err(format!("Deezer answered {}", res.status()));
        }

        let data: DeezerSearchResponse = res.json().await.map_err(|e| e.to_string())?;
        Ok(data.data.into_iter().map(CatalogTrack::from).collect())
    }
}
