use tabled::Table;

use crate::{info, spotify, types::PlaylistTrackRow, utils, warning};

pub async fn playlist(id: String) {
    let conn = super::connect().await;

    let details = match spotify::playlists::get_playlist(&conn.client, &id).await {
        Ok(d) => d,
        Err(e) => super::fail(e),
    };

    info!("{}", details.name);
    if let Some(description) = details.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", description);
    }

    let rows: Vec<PlaylistTrackRow> = details
        .tracks
        .items
        .into_iter()
        .filter_map(|item| item.track)
        .enumerate()
        .map(|(i, track)| PlaylistTrackRow {
            position: i + 1,
            artists: track.artist_names(),
            album: track
                .album
                .as_ref()
                .and_then(|a| a.name.clone())
                .unwrap_or_default(),
            duration: track.duration_ms.map(utils::format_duration).unwrap_or_default(),
            name: track.name.unwrap_or_default(),
        })
        .collect();

    if rows.is_empty() {
        warning!("Playlist has no tracks");
        return;
    }

    println!("{}", Table::new(rows));
}
