use tracing::warn;

use crate::{
    dto::health::HealthResponse,
    state::{RoundPhase, SharedState},
};

/// Report store connectivity and whether a round is loaded, logging store issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let playlist_loaded = state.engine().phase().await != RoundPhase::Empty;
    HealthResponse::new(state.is_degraded(), playlist_loaded)
}
