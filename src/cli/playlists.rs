use tabled::Table;

use crate::{spotify, types::PlaylistTableRow, warning};

pub async fn playlists(search: Option<String>) {
    let conn = super::connect().await;

    let mut playlists = match spotify::playlists::get_user_playlists(&conn.client).await {
        Ok(p) => p,
        Err(e) => super::fail(e),
    };

    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    if let Some(term) = search {
        let term = term.to_lowercase();
        playlists.retain(|p| p.name.to_lowercase().contains(&term));
    }

    if playlists.is_empty() {
        warning!("No playlists found");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            id: p.id,
            name: p.name,
            tracks: p.tracks.total,
        })
        .collect();

    println!("{}", Table::new(rows));
}
