use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::game::PlaylistCountsResponse, error::AppError, services::game_service,
    state::SharedState,
};

/// Routes generating the playlist of the current round.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/playlist/generate/{artist}", get(generate_playlist))
}

/// Fetch the artist's catalog and start a new round with it.
#[utoipa::path(
    get,
    path = "/api/playlist/generate/{artist}",
    tag = "game",
    params(("artist" = String, Path, description = "Artist seeding the playlist")),
    responses(
        (status = 200, description = "Playlist generated", body = PlaylistCountsResponse),
        (status = 404, description = "No songs for this artist", body = crate::error::ErrorBody),
        (status = 503, description = "Catalog provider unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn generate_playlist(
    State(state): State<SharedState>,
    Path(artist): Path<String>,
) -> Result<Json<PlaylistCountsResponse>, AppError> {
    let counts = game_service::set_playlist(&state, &artist).await?;
    Ok(Json(counts))
}
