pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{RoomEntity, UserEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for users and rooms.
pub trait DocumentStore: Send + Sync {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_user_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Case-insensitive lookup.
    fn find_user_by_username(
        &self,
        username: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Case-insensitive lookup.
    fn find_room_by_name(
        &self,
        room_name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    fn find_room_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    fn update_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Returns whether a room was removed.
    fn delete_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
