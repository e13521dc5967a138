use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::game::{GuessRequest, GuessResponse, NextSongResponse, PlaylistCountsResponse},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes serving songs of the current round.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/song/random", get(random_song))
        .route("/api/song/counts", get(song_counts))
        .route("/api/song/guess", post(guess_song))
}

/// Draw a song not yet played in this round, skipping tracks without a preview.
#[utoipa::path(
    get,
    path = "/api/song/random",
    tag = "game",
    responses(
        (status = 200, description = "Next song", body = NextSongResponse),
        (status = 404, description = "No playlist generated", body = crate::error::ErrorBody),
        (status = 503, description = "Every song has been played, no playable song is left or the round was replaced", body = crate::error::ErrorBody)
    )
)]
pub async fn random_song(
    State(state): State<SharedState>,
) -> Result<Json<NextSongResponse>, AppError> {
    let song = game_service::next_song(&state).await?;
    Ok(Json(song))
}

#[utoipa::path(
    get,
    path = "/api/song/counts",
    tag = "game",
    responses((status = 200, description = "Playlist size and songs left", body = PlaylistCountsResponse))
)]
pub async fn song_counts(State(state): State<SharedState>) -> Json<PlaylistCountsResponse> {
    Json(game_service::counts(&state).await)
}

#[utoipa::path(
    post,
    path = "/api/song/guess",
    tag = "game",
    request_body = GuessRequest,
    responses((status = 200, description = "Guess verdict", body = GuessResponse))
)]
pub async fn guess_song(Json(payload): Json<GuessRequest>) -> Json<GuessResponse> {
    Json(game_service::guess(&payload))
}
