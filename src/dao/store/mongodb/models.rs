use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::{
    catalog::Track,
    dao::models::{RoomEntity, RoomMemberEntity, UserEntity},
};

pub const USER_COLLECTION_NAME: &str = "users";
pub const ROOM_COLLECTION_NAME: &str = "rooms";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    username_lower: String,
    email: Option<String>,
    password_hash: String,
    salt: String,
    created_at: DateTime,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.to_string(),
            username_lower: value.username.to_lowercase(),
            username: value.username,
            email: value.email,
            password_hash: value.password_hash,
            salt: value.salt,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(USER_COLLECTION_NAME, &value.id)?,
            username: value.username,
            email: value.email,
            password_hash: value.password_hash,
            salt: value.salt,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoomMember {
    user_id: String,
    username: String,
    score: i32,
    is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoomDocument {
    #[serde(rename = "_id")]
    id: String,
    room_name: String,
    users: Vec<MongoRoomMember>,
    playlist: Vec<Track>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<RoomEntity> for MongoRoomDocument {
    fn from(value: RoomEntity) -> Self {
        Self {
            id: value.id.to_string(),
            room_name: value.room_name.to_lowercase(),
            users: value
                .users
                .into_iter()
                .map(|member| MongoRoomMember {
                    user_id: member.user_id.to_string(),
                    username: member.username,
                    score: member.score,
                    is_host: member.is_host,
                })
                .collect(),
            playlist: value.playlist,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoRoomDocument> for RoomEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoRoomDocument) -> MongoResult<Self> {
        let users = value
            .users
            .into_iter()
            .map(|member| {
                Ok(RoomMemberEntity {
                    user_id: parse_id(ROOM_COLLECTION_NAME, &member.user_id)?,
                    username: member.username,
                    score: member.score,
                    is_host: member.is_host,
                })
            })
            .collect::<MongoResult<Vec<_>>>()?;

        Ok(Self {
            id: parse_id(ROOM_COLLECTION_NAME, &value.id)?,
            room_name: value.room_name,
            users,
            playlist: value.playlist,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

fn parse_id(collection: &'static str, id: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(id).map_err(|source| MongoDaoError::CorruptId {
        collection,
        id: id.to_owned(),
        source,
    })
}
