use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::room::{CreateRoomRequest, RoomResponse, RoomUpdateRequest},
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Multiplayer room routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/room", post(create_room))
        .route("/api/room/{identifier}", get(retrieve_room).put(update_room))
}

/// Open a room for the user, or return the one they already host.
#[utoipa::path(
    post,
    path = "/api/room",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created or already hosted", body = RoomResponse),
        (status = 400, description = "Missing artist", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown user or no songs for the artist", body = crate::error::ErrorBody)
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    Ok(Json(room_service::create_room(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/room/{identifier}",
    tag = "rooms",
    params(("identifier" = String, Path, description = "Room name or identifier")),
    responses(
        (status = 200, description = "Room", body = RoomResponse),
        (status = 404, description = "Room not found", body = crate::error::ErrorBody)
    )
)]
pub async fn retrieve_room(
    State(state): State<SharedState>,
    Path(identifier): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    Ok(Json(room_service::retrieve_room(&state, &identifier).await?))
}

/// Join or leave the room hosted by `owner_name`.
#[utoipa::path(
    put,
    path = "/api/room/{identifier}",
    tag = "rooms",
    request_body = RoomUpdateRequest,
    params(("identifier" = String, Path, description = "Host username owning the room")),
    responses(
        (status = 200, description = "Updated room, or no room once it closed", body = RoomResponse),
        (status = 400, description = "Unknown operation", body = crate::error::ErrorBody),
        (status = 404, description = "Room or user not found", body = crate::error::ErrorBody)
    )
)]
pub async fn update_room(
    State(state): State<SharedState>,
    Path(owner_name): Path<String>,
    Json(payload): Json<RoomUpdateRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    Ok(Json(
        room_service::update_room(&state, &owner_name, payload).await?,
    ))
}
