use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoRoomDocument, MongoUserDocument, ROOM_COLLECTION_NAME, USER_COLLECTION_NAME},
};
use crate::dao::{
    models::{RoomEntity, UserEntity},
    storage::StorageResult,
    store::DocumentStore,
};

/// MongoDB-backed [`DocumentStore`] implementation.
#[derive(Clone)]
pub struct MongoDocumentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

impl MongoDocumentStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let users = database.collection::<Document>(USER_COLLECTION_NAME);
        users
            .create_index(unique_index("username_lower", "user_username_idx"))
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: USER_COLLECTION_NAME,
                index: "username_lower",
                source,
            })?;

        let rooms = database.collection::<Document>(ROOM_COLLECTION_NAME);
        rooms
            .create_index(unique_index("room_name", "room_name_idx"))
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ROOM_COLLECTION_NAME,
                index: "room_name",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database().await.collection(USER_COLLECTION_NAME)
    }

    async fn rooms(&self) -> Collection<MongoRoomDocument> {
        self.database().await.collection(ROOM_COLLECTION_NAME)
    }

    async fn save_user(&self, user: UserEntity, filter: Document) -> MongoResult<()> {
        let document = MongoUserDocument::from(user);
        self.users()
            .await
            .replace_one(filter, &document)
            .upsert(true)
            .await
            .map_err(|source| {
                MongoDaoError::from_write(USER_COLLECTION_NAME, "username", source)
            })?;
        Ok(())
    }

    async fn find_user(&self, filter: Document) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: USER_COLLECTION_NAME,
                source,
            })?;
        document.map(UserEntity::try_from).transpose()
    }

    async fn save_room(&self, room: RoomEntity) -> MongoResult<()> {
        let filter = id_filter(room.id);
        let document = MongoRoomDocument::from(room);
        self.rooms()
            .await
            .replace_one(filter, &document)
            .upsert(true)
            .await
            .map_err(|source| {
                MongoDaoError::from_write(ROOM_COLLECTION_NAME, "room_name", source)
            })?;
        Ok(())
    }

    async fn find_room(&self, filter: Document) -> MongoResult<Option<RoomEntity>> {
        let document = self
            .rooms()
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: ROOM_COLLECTION_NAME,
                source,
            })?;
        document.map(RoomEntity::try_from).transpose()
    }

    async fn delete_room(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .rooms()
            .await
            .delete_one(id_filter(id))
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: ROOM_COLLECTION_NAME,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }
}

fn unique_index(field: &str, name: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(field, 1);
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(Some(name.to_owned()))
                .unique(Some(true))
                .build(),
        )
        .build()
}

impl DocumentStore for MongoDocumentStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = id_filter(user.id);
            store.save_user(user, filter).await.map_err(Into::into)
        })
    }

    fn find_user_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id_filter(id)).await.map_err(Into::into) })
    }

    fn find_user_by_username(
        &self,
        username: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        let filter = doc! { "username_lower": username.to_lowercase() };
        Box::pin(async move { store.find_user(filter).await.map_err(Into::into) })
    }

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        let filter = doc! { "email": email };
        Box::pin(async move { store.find_user(filter).await.map_err(Into::into) })
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.insert_user(user)
    }

    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_room(room).await.map_err(Into::into) })
    }

    fn find_room_by_name(
        &self,
        room_name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        let filter = doc! { "room_name": room_name.to_lowercase() };
        Box::pin(async move { store.find_room(filter).await.map_err(Into::into) })
    }

    fn find_room_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(id_filter(id)).await.map_err(Into::into) })
    }

    fn update_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.insert_room(room)
    }

    fn delete_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_room(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
