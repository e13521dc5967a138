mod config;
mod connection;
mod error;
mod models;
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoDocumentStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::Duplicate { field, .. } => StorageError::conflict(field),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_username_becomes_a_storage_conflict() {
        let err = StorageError::from(MongoDaoError::Duplicate {
            collection: "users",
            field: "username",
        });

        assert!(matches!(err, StorageError::Conflict { field: "username" }));
    }

    #[test]
    fn other_failures_leave_the_store_unavailable() {
        let err = StorageError::from(MongoDaoError::Query {
            collection: "rooms",
            source: mongodb::error::Error::custom("socket closed"),
        });

        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
