use crate::{
    error::ApiError,
    spotify::client::ResilientClient,
    types::{Page, Playlist, PlaylistDetails, PlaylistItem, Track},
};

/// Upper bound of pages followed for a single listing.
const MAX_PAGES: usize = 50;

/// Retrieves every playlist of the signed-in user.
///
/// Follows the `next` links of `GET /me/playlists` until the listing is
/// exhausted.
pub async fn get_user_playlists(client: &ResilientClient) -> Result<Vec<Playlist>, ApiError> {
    collect_pages(client, "me/playlists?limit=50".to_string()).await
}

/// Retrieves the tracks of one playlist.
///
/// Entries whose `track` is `null` (local files, removed tracks) are skipped.
pub async fn get_playlist_tracks(
    client: &ResilientClient,
    playlist_id: &str,
) -> Result<Vec<Track>, ApiError> {
    let items: Vec<PlaylistItem> = collect_pages(
        client,
        format!("playlists/{}/tracks?limit=100", playlist_id),
    )
    .await?;

    Ok(items.into_iter().filter_map(|item| item.track).collect())
}

/// Retrieves one playlist with all of its entries.
///
/// `GET /playlists/{id}` embeds only the first page of entries; the rest are
/// fetched through the `next` links, so `tracks.next` is always `None` on
/// return. Entries with a `null` track are kept as they are.
pub async fn get_playlist(
    client: &ResilientClient,
    playlist_id: &str,
) -> Result<PlaylistDetails, ApiError> {
    let mut details: PlaylistDetails = client.get(&format!("playlists/{}", playlist_id)).await?;

    let first = Page {
        items: std::mem::take(&mut details.tracks.items),
        next: details.tracks.next.take(),
    };
    details.tracks.items = follow_pages(client, first).await?;

    Ok(details)
}

async fn collect_pages<T>(client: &ResilientClient, first: String) -> Result<Vec<T>, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    let page: Page<T> = client.get(&first).await?;
    follow_pages(client, page).await
}

async fn follow_pages<T>(client: &ResilientClient, mut page: Page<T>) -> Result<Vec<T>, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    let mut items = Vec::new();
    let mut pages = 1;

    loop {
        items.append(&mut page.items);

        let Some(next) = page.next.take() else {
            break;
        };
        if pages >= MAX_PAGES {
            break;
        }
        page = client.get(&next).await?;
        pages += 1;
    }

    Ok(items)
}
