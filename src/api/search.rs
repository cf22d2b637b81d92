use std::{collections::HashMap, sync::Arc};

use axum::{Extension, Json, extract::Query, http::StatusCode};
use serde_json::{Value, json};

use crate::{catalog::CatalogProxy, warning};

/// `GET /api/search?songName=<q>`
///
/// Answers `{"tracks": [...]}`, or `{"error": ...}` with 400 when no song name
/// is given and 500 when the catalog could not be reached.
pub async fn search(
    Query(params): Query<HashMap<String, String>>,
    Extension(proxy): Extension<Arc<CatalogProxy>>,
) -> (StatusCode, Json<Value>) {
    let Some(song_name) = params
        .get("songName")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "songName is required" })),
        );
    };

    match proxy.search(song_name).await {
        Ok(tracks) => (StatusCode::OK, Json(json!({ "tracks": tracks }))),
        Err(e) => {
            warning!("Catalog search for \"{}\" failed: {}", song_name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "track search failed" })),
            )
        }
    }
}
