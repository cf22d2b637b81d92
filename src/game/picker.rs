use rand::seq::IndexedRandom;

use crate::{
    error::ApiError,
    spotify::{client::ResilientClient, playlists},
    types::{Playlist, Track},
    utils,
};

/// The track the player has to name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnTrack {
    pub name: String,
    pub artist: String,
    pub playlist: String,
}

impl DrawnTrack {
    /// `"<track> - <artist>"`, also the query for the preview lookup.
    pub fn answer(&self) -> String {
        utils::format_guess(&self.name, &self.artist)
    }
}

/// Draws a uniformly random track from a uniformly random playlist of the user.
pub async fn draw_random_track(client: &ResilientClient) -> Result<DrawnTrack, ApiError> {
    let all = playlists::get_user_playlists(client).await?;
    let playlist = choose_playlist(&all)?;

    let tracks = playlists::get_playlist_tracks(client, &playlist.id).await?;
    if tracks.is_empty() {
        return Err(ApiError::UpstreamDataEmpty(format!(
            "No tracks found in playlist \"{}\"",
            playlist.name
        )));
    }

    let (name, artist) = choose_track(&tracks).ok_or_else(|| {
        ApiError::UpstreamDataEmpty(format!(
            "No playable track found in playlist \"{}\"",
            playlist.name
        ))
    })?;

    Ok(DrawnTrack {
        name: name.to_string(),
        artist: artist.to_string(),
        playlist: playlist.name.clone(),
    })
}

pub fn choose_playlist(playlists: &[Playlist]) -> Result<&Playlist, ApiError> {
    playlists
        .choose(&mut rand::rng())
        .ok_or_else(|| ApiError::UpstreamDataEmpty("No playlists found".to_string()))
}

/// Picks among the tracks that have a name and a named first artist.
pub fn choose_track(tracks: &[Track]) -> Option<(&str, &str)> {
    let valid = playable(tracks);
    valid.choose(&mut rand::rng()).copied()
}

/// `(track, first artist)` for every track the player can be asked about.
pub fn playable(tracks: &[Track]) -> Vec<(&str, &str)> {
    tracks
        .iter()
        .filter_map(|track| {
            let name = track.name.as_deref().filter(|n| !n.is_empty())?;
            let artist = track
                .artists
                .first()
                .and_then(|a| a.name.as_deref())
                .filter(|n| !n.is_empty())?;
            Some((name, artist))
        })
        .collect()
}
