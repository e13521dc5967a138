use tracing::{info, warn};

use crate::{
    catalog::Track,
    dto::game::{GuessRequest, GuessResponse, NextSongResponse, PlaylistCountsResponse},
    error::ServiceError,
    state::SharedState,
};

/// Fetch `artist`'s catalog and seed the round with it.
///
/// The current round is left untouched when the fetch fails or the catalog is too small.
pub async fn set_playlist(
    state: &SharedState,
    artist: &str,
) -> Result<PlaylistCountsResponse, ServiceError> {
    let catalog = fetch_viable_catalog(state, artist).await?;
    let counts = state.engine().seed(catalog).await;
    info!(%artist, tracks = counts.playlist_length, "playlist generated");
    Ok(counts.into())
}

/// Draw the next playable song of the current round.
///
/// Failures carry the round's counts so clients can tell an empty round from an
/// exhausted one.
pub async fn next_song(state: &SharedState) -> Result<NextSongResponse, ServiceError> {
    match state.engine().draw_next().await {
        Ok(song) => Ok(song.into()),
        Err(source) => Err(ServiceError::Draw {
            source,
            counts: Some(state.engine().counts().await),
        }),
    }
}

/// Size of the current round and songs left to play.
pub async fn counts(state: &SharedState) -> PlaylistCountsResponse {
    state.engine().counts().await.into()
}

/// Score a guess. Every guess is accepted for now.
pub fn guess(request: &GuessRequest) -> GuessResponse {
    // TODO: compare against the song being played once rounds track it per room.
    warn!(
        song = request.song.as_deref().unwrap_or_default(),
        artist = request.artist.as_deref().unwrap_or_default(),
        "title matching not implemented; accepting guess"
    );
    GuessResponse {
        correct: true,
        score: 1,
    }
}

/// Fetch the catalog for `artist`, rejecting catalogs below the configured minimum.
pub async fn fetch_viable_catalog(
    state: &SharedState,
    artist: &str,
) -> Result<Vec<Track>, ServiceError> {
    let artist = artist.trim();
    if artist.is_empty() {
        return Err(ServiceError::MissingArtist);
    }

    let catalog = state
        .catalog()
        .fetch_artist_catalog(artist)
        .await
        .map_err(|err| {
            warn!(%artist, error = %err, "catalog fetch failed");
            ServiceError::from_catalog(artist, err)
        })?;

    let minimum = state.config().game.min_playlist_length;
    if catalog.len() < minimum {
        warn!(%artist, tracks = catalog.len(), minimum, "catalog too small for a round");
        return Err(ServiceError::NoSongsForArtist {
            artist: artist.to_owned(),
        });
    }

    Ok(catalog)
}
