//! Name That Song backend entrypoint wiring the REST API, the catalog client and the document store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use name_that_song_back::{
    catalog::HttpCatalogClient,
    config::AppConfig,
    dao::store::memory::MemoryStore,
    routes,
    state::{AppState, SharedState},
};

const DEFAULT_PORT: u16 = 8008;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let catalog =
        HttpCatalogClient::new(config.catalog.clone()).context("building catalog client")?;
    let app_state = AppState::new(config, Arc::new(catalog));

    install_store(&app_state).await;
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the document store from `STORAGE_BACKEND` (`mongo` by default, or `memory`).
async fn install_store(state: &SharedState) {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "mongo".into());
    match backend.to_ascii_lowercase().as_str() {
        "memory" => {
            info!("using in-memory document store");
            state.set_store(Arc::new(MemoryStore::new())).await;
        }
        "mongo" => spawn_mongo_supervisor(state.clone()).await,
        other => {
            warn!(backend = other, "unknown storage backend; using in-memory store");
            state.set_store(Arc::new(MemoryStore::new())).await;
        }
    }
}

/// Supervise the MongoDB connection in the background, toggling degraded mode
/// when connectivity changes.
#[cfg(feature = "mongo-store")]
async fn spawn_mongo_supervisor(state: SharedState) {
    use name_that_song_back::{
        dao::{
            storage::StorageError,
            store::{
                DocumentStore,
                mongodb::{MongoConfig, MongoDocumentStore},
            },
        },
        services::storage_supervisor,
    };

    let uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = env::var("MONGO_DB").ok();

    tokio::spawn(storage_supervisor::run(state, move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoDocumentStore::connect(config).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn DocumentStore>)
        }
    }));
}

#[cfg(not(feature = "mongo-store"))]
async fn spawn_mongo_supervisor(state: SharedState) {
    warn!("built without the `mongo-store` feature; using in-memory store");
    state.set_store(Arc::new(MemoryStore::new())).await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
