use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::catalog::Track;

/// Registered player account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable identifier for the user.
    pub id: Uuid,
    /// Display name, unique regardless of case.
    pub username: String,
    /// Optional contact address, unique when present.
    pub email: Option<String>,
    /// Hex encoded `sha512(salt + password)`.
    pub password_hash: String,
    pub salt: String,
    pub created_at: SystemTime,
}

/// Member of a room with their running score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomMemberEntity {
    pub user_id: Uuid,
    pub username: String,
    pub score: i32,
    /// Whether this member created the room.
    pub is_host: bool,
}

/// Multiplayer room hosted by one user and seeded with an artist playlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Stable identifier for the room.
    pub id: Uuid,
    /// Lowercased username of the host.
    pub room_name: String,
    /// Members in join order; the host comes first.
    pub users: Vec<RoomMemberEntity>,
    /// Catalog fetched when the room was created.
    pub playlist: Vec<Track>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl RoomEntity {
    /// Whether `user_id` is a member of the room.
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.users.iter().any(|member| member.user_id == user_id)
    }

    /// The hosting member, if still present.
    pub fn host(&self) -> Option<&RoomMemberEntity> {
        self.users.iter().find(|member| member.is_host)
    }
}
