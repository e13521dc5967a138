use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{RoomEntity, RoomMemberEntity};

use super::format_system_time;

/// Request to open a room seeded with an artist's catalog.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub artist: Option<String>,
}

/// Join or leave a room.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdateRequest {
    /// `join` or `leave`, case-insensitive.
    pub operation: String,
    pub user_id: Uuid,
}

/// Supported room updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOperation {
    Join,
    Leave,
}

impl RoomOperation {
    pub fn parse(operation: &str) -> Option<Self> {
        match operation.to_ascii_lowercase().as_str() {
            "join" => Some(RoomOperation::Join),
            "leave" => Some(RoomOperation::Leave),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberSummary {
    pub user_id: Uuid,
    pub username: String,
    pub score: i32,
    pub is_host: bool,
}

impl From<RoomMemberEntity> for RoomMemberSummary {
    fn from(value: RoomMemberEntity) -> Self {
        Self {
            user_id: value.user_id,
            username: value.username,
            score: value.score,
            is_host: value.is_host,
        }
    }
}

/// Room as exposed to clients. The playlist stays server side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: Uuid,
    pub room_name: String,
    pub users: Vec<RoomMemberSummary>,
    pub playlist_length: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RoomEntity> for RoomSummary {
    fn from(value: RoomEntity) -> Self {
        Self {
            id: value.id,
            room_name: value.room_name,
            users: value.users.into_iter().map(Into::into).collect(),
            playlist_length: value.playlist.len(),
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// Envelope used by every room endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    /// `None` once the last member left and the room was closed.
    pub room: Option<RoomSummary>,
}
