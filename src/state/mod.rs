pub mod engine;
pub mod picker;
pub mod playlist;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    catalog::CatalogClient, config::AppConfig, dao::store::DocumentStore, error::ServiceError,
};

pub use self::engine::{DrawnSong, PlaylistEngine};
pub use self::playlist::{DrawError, PlaylistCounts, RoundPhase};
use self::picker::{IndexPicker, RandomIndexPicker};

pub type SharedState = Arc<AppState>;

/// Central application state: the single active round, the external catalog client
/// and the document store handle.
pub struct AppState {
    store: RwLock<Option<Arc<dyn DocumentStore>>>,
    degraded: watch::Sender<bool>,
    engine: PlaylistEngine,
    catalog: Arc<dyn CatalogClient>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a document store is installed.
    pub fn new(config: AppConfig, catalog: Arc<dyn CatalogClient>) -> SharedState {
        Self::with_picker(config, catalog, Arc::new(RandomIndexPicker))
    }

    /// Same as [`AppState::new`] with an explicit index picker.
    pub fn with_picker(
        config: AppConfig,
        catalog: Arc<dyn CatalogClient>,
        picker: Arc<dyn IndexPicker>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let engine = PlaylistEngine::new(
            catalog.clone(),
            picker,
            config.game.pick_range,
            config.game.lookup_timeout(),
        );
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            engine,
            catalog,
            config,
        })
    }

    /// Obtain a handle to the current document store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn DocumentStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Document store handle, or [`ServiceError::Degraded`] when none is usable.
    pub async fn require_store(&self) -> Result<Arc<dyn DocumentStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a document store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn DocumentStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current document store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// The process-wide playlist engine.
    pub fn engine(&self) -> &PlaylistEngine {
        &self.engine
    }

    /// Client for the metadata and preview providers.
    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
