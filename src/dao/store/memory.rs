//! Process-local [`DocumentStore`] used by tests and `STORAGE_BACKEND=memory`.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use super::DocumentStore;
use crate::dao::{
    models::{RoomEntity, UserEntity},
    storage::{StorageError, StorageResult},
};

/// Usernames and room names are unique ignoring case, emails are unique as written.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<Uuid, UserEntity>>,
    rooms: Arc<DashMap<Uuid, RoomEntity>>,
    writes: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_where(&self, predicate: impl Fn(&UserEntity) -> bool) -> Option<UserEntity> {
        self.users
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }

    fn save_user(&self, user: UserEntity) -> StorageResult<()> {
        let _writes = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        let other = |candidate: &UserEntity| candidate.id != user.id;

        if self
            .user_where(|candidate| {
                other(candidate) && candidate.username.eq_ignore_ascii_case(&user.username)
            })
            .is_some()
        {
            return Err(StorageError::conflict("username"));
        }
        if let Some(email) = user.email.as_deref() {
            if self
                .user_where(|candidate| {
                    other(candidate) && candidate.email.as_deref() == Some(email)
                })
                .is_some()
            {
                return Err(StorageError::conflict("email"));
            }
        }

        self.users.insert(user.id, user);
        Ok(())
    }

    fn save_room(&self, room: RoomEntity) -> StorageResult<()> {
        let _writes = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        let taken = self.rooms.iter().any(|entry| {
            entry.id != room.id && entry.room_name.eq_ignore_ascii_case(&room.room_name)
        });
        if taken {
            return Err(StorageError::conflict("room_name"));
        }

        self.rooms.insert(room.id, room);
        Ok(())
    }
}

fn ready<T: Send + 'static>(value: T) -> BoxFuture<'static, StorageResult<T>> {
    settled(Ok(value))
}

fn settled<T: Send + 'static>(result: StorageResult<T>) -> BoxFuture<'static, StorageResult<T>> {
    Box::pin(async move { result })
}

impl DocumentStore for MemoryStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        settled(self.save_user(user))
    }

    fn find_user_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        ready(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    fn find_user_by_username(
        &self,
        username: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        ready(self.user_where(|user| user.username.eq_ignore_ascii_case(username)))
    }

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        ready(self.user_where(|user| user.email.as_deref() == Some(email)))
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        settled(self.save_user(user))
    }

    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        settled(self.save_room(room))
    }

    fn find_room_by_name(
        &self,
        room_name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let found = self
            .rooms
            .iter()
            .find(|entry| entry.room_name.eq_ignore_ascii_case(room_name))
            .map(|entry| entry.value().clone());
        ready(found)
    }

    fn find_room_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        ready(self.rooms.get(&id).map(|entry| entry.value().clone()))
    }

    fn update_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        settled(self.save_room(room))
    }

    fn delete_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(self.rooms.remove(&id).is_some())
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(())
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(())
    }
}
