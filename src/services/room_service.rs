use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{RoomEntity, RoomMemberEntity},
    dto::room::{CreateRoomRequest, RoomOperation, RoomResponse, RoomUpdateRequest},
    error::ServiceError,
    services::game_service::fetch_viable_catalog,
    state::SharedState,
};

/// Open a room for `user_id` seeded with `artist`'s catalog.
///
/// A host owns at most one room: if one already exists it is returned as is.
pub async fn create_room(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<RoomResponse, ServiceError> {
    let artist = request
        .artist
        .filter(|artist| !artist.trim().is_empty())
        .ok_or(ServiceError::MissingArtist)?;

    let store = state.require_store().await?;
    let host = store
        .find_user_by_id(request.user_id)
        .await?
        .ok_or(ServiceError::UserNotFound)?;

    let room_name = host.username.to_lowercase();
    if let Some(existing) = store.find_room_by_name(&room_name).await? {
        return Ok(respond(existing));
    }

    let playlist = fetch_viable_catalog(state, &artist).await?;
    let now = SystemTime::now();
    let room = RoomEntity {
        id: Uuid::new_v4(),
        room_name,
        users: vec![RoomMemberEntity {
            user_id: host.id,
            username: host.username,
            score: 0,
            is_host: true,
        }],
        playlist,
        created_at: now,
        updated_at: now,
    };
    store.insert_room(room.clone()).await?;
    info!(room = %room.room_name, %artist, tracks = room.playlist.len(), "room created");

    Ok(respond(room))
}

/// Look a room up by name (case-insensitive), then by id.
pub async fn retrieve_room(
    state: &SharedState,
    identifier: &str,
) -> Result<RoomResponse, ServiceError> {
    let store = state.require_store().await?;

    if let Some(room) = store.find_room_by_name(identifier).await? {
        return Ok(respond(room));
    }
    if let Ok(id) = Uuid::parse_str(identifier) {
        if let Some(room) = store.find_room_by_id(id).await? {
            return Ok(respond(room));
        }
    }

    Err(ServiceError::RoomNotFound {
        identifier: identifier.to_owned(),
    })
}

/// Apply a join or leave to the room hosted by `owner_name`.
pub async fn update_room(
    state: &SharedState,
    owner_name: &str,
    request: RoomUpdateRequest,
) -> Result<RoomResponse, ServiceError> {
    let Some(operation) = RoomOperation::parse(&request.operation) else {
        return Err(ServiceError::UnknownRoomOperation {
            operation: request.operation,
        });
    };

    match operation {
        RoomOperation::Join => join_room(state, owner_name, request.user_id).await,
        RoomOperation::Leave => leave_room(state, owner_name, request.user_id).await,
    }
}

async fn load_room(state: &SharedState, owner_name: &str) -> Result<RoomEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_room_by_name(owner_name)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound {
            identifier: owner_name.to_owned(),
        })
}

/// Add `user_id` to the room. Joining twice leaves the room unchanged.
pub async fn join_room(
    state: &SharedState,
    owner_name: &str,
    user_id: Uuid,
) -> Result<RoomResponse, ServiceError> {
    let mut room = load_room(state, owner_name).await?;
    if room.has_member(user_id) {
        return Ok(respond(room));
    }

    let store = state.require_store().await?;
    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or(ServiceError::UserNotFound)?;

    room.users.push(RoomMemberEntity {
        user_id: user.id,
        username: user.username,
        score: 0,
        is_host: false,
    });
    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    info!(room = %room.room_name, %user_id, members = room.users.len(), "user joined room");

    Ok(respond(room))
}

/// Remove `user_id` from the room, closing it when the host leaves or nobody is left.
pub async fn leave_room(
    state: &SharedState,
    owner_name: &str,
    user_id: Uuid,
) -> Result<RoomResponse, ServiceError> {
    let mut room = load_room(state, owner_name).await?;
    let Some(position) = room.users.iter().position(|member| member.user_id == user_id) else {
        return Ok(respond(room));
    };

    let store = state.require_store().await?;
    let departed = room.users.remove(position);
    if departed.is_host || room.users.is_empty() {
        store.delete_room(room.id).await?;
        info!(room = %room.room_name, %user_id, "room closed");
        return Ok(RoomResponse { room: None });
    }

    room.updated_at = SystemTime::now();
    store.update_room(room.clone()).await?;
    info!(room = %room.room_name, %user_id, members = room.users.len(), "user left room");
    Ok(respond(room))
}

fn respond(room: RoomEntity) -> RoomResponse {
    RoomResponse {
        room: Some(room.into()),
    }
}
