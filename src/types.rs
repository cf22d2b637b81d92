use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Terminal state of a token whose refresh could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenError {
    #[serde(rename = "RefreshAccessTokenError")]
    RefreshFailed,
}

/// Access/refresh token pair as owned by the session coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TokenError>,
}

impl Token {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }
}

/// Tokens handed out by an interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Grant {
    /// `None` when `expires_in` cannot be turned into an expiry date.
    pub fn from_expires_in(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
    ) -> Option<Self> {
        Some(Self {
            access_token,
            refresh_token,
            expires_at: crate::utils::expiry_after(Utc::now(), expires_in)?,
        })
    }
}

impl From<Grant> for Token {
    fn from(grant: Grant) -> Self {
        Token {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
            error: None,
        }
    }
}

/// Read-only view of the current token handed to the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub error: Option<TokenError>,
}

impl From<&Token> for Session {
    fn from(token: &Token) -> Self {
        Session {
            access_token: Some(token.access_token.clone()),
            error: token.error,
        }
    }
}

/// State shared between the login flow and the `/callback` handler.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub code_verifier: String,
    pub grant: Option<Grant>,
}

/// Body of a successful `POST /api/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Body of a failed `POST /api/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCount {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: TrackCount,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub tracks: u64,
}

/// One page of a Spotify paging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackAlbum {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    pub album: Option<TrackAlbum>,
    pub duration_ms: Option<u64>,
}

impl Track {
    /// Artist names joined for display, skipping unnamed entries.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .filter_map(|a| a.name.as_deref())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Entry of `GET /playlists/{id}/tracks`. Local or removed tracks come back as
/// `track: null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// Body of `GET /playlists/{id}`. The embedded `tracks` page is the first one
/// only until the remaining pages are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub tracks: Page<PlaylistItem>,
}

#[derive(Tabled)]
pub struct PlaylistTrackRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogArtist {
    pub name: String,
}

/// Track as returned by the catalog proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    pub artist: CatalogArtist,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSearchResponse {
    pub tracks: Vec<CatalogTrack>,
}

/// Raw Deezer `/search` payload, as consumed by the proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct DeezerSearchResponse {
    #[serde(default)]
    pub data: Vec<DeezerTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    pub title: String,
    pub artist: CatalogArtist,
    #[serde(default)]
    pub preview: String,
}

impl From<DeezerTrack> for CatalogTrack {
    fn from(track: DeezerTrack) -> Self {
        CatalogTrack {
            id: track.id.to_string(),
            title: track.title,
            artist: track.artist,
            preview: track.preview,
        }
    }
}
