use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", or "degraded" while the document store is unreachable.
    pub status: String,
    /// Whether a playlist has been generated.
    pub playlist_loaded: bool,
}

impl HealthResponse {
    pub fn new(degraded: bool, playlist_loaded: bool) -> Self {
        Self {
            status: if degraded { "degraded" } else { "ok" }.to_string(),
            playlist_loaded,
        }
    }
}
