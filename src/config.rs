//! Application-level configuration loading: external provider endpoints and game tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::picker::PickRange;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "NAME_THAT_SONG_CONFIG_PATH";
/// Environment variable holding the metadata provider API key.
const CATALOG_API_KEY_ENV: &str = "CATALOG_API_KEY";
/// Environment variable holding the preview provider bearer token.
const PREVIEW_API_TOKEN_ENV: &str = "PREVIEW_API_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// External provider settings.
    pub catalog: CatalogSettings,
    /// Round tuning.
    pub game: GameSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Endpoints and query parameters of the metadata and preview providers.
pub struct CatalogSettings {
    /// Playlist generation endpoint of the metadata provider.
    pub base_url: String,
    /// API key sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// Response format requested from the metadata provider.
    pub format: String,
    /// Number of candidate songs requested per playlist.
    pub results: u32,
    /// Playlist generation strategy (e.g. `artist-radio`).
    #[serde(rename = "type")]
    pub playlist_type: String,
    /// Track search endpoint of the preview provider.
    pub preview_base_url: String,
    /// Optional bearer token for the preview provider.
    pub preview_token: Option<String>,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "http://developer.echonest.com/api/v4/playlist/basic".into(),
            api_key: None,
            format: "json".into(),
            results: 200,
            playlist_type: "artist-radio".into(),
            preview_base_url: "https://api.spotify.com/v1/search".into(),
            preview_token: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl CatalogSettings {
    /// HTTP request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Tuning of the playlist rounds.
pub struct GameSettings {
    /// Smallest catalog accepted when generating a playlist.
    pub min_playlist_length: usize,
    /// Upper bound on a single preview lookup.
    pub lookup_timeout_ms: u64,
    /// Range handed to the random index picker.
    pub pick_range: PickRange,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_playlist_length: 10,
            lookup_timeout_ms: 5_000,
            pick_range: PickRange::Corrected,
        }
    }
}

impl GameSettings {
    /// Preview lookup timeout as a [`Duration`].
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults,
    /// then apply secrets taken from the environment.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.apply_env_overrides();
        if config.catalog.api_key.is_none() {
            warn!("no catalog API key configured; playlist generation will likely fail");
        }
        config
    }

    /// Parse a configuration document; missing keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env(CATALOG_API_KEY_ENV) {
            self.catalog.api_key = Some(key);
        }
        if let Some(token) = non_empty_env(PREVIEW_API_TOKEN_ENV) {
            self.catalog.preview_token = Some(token);
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "game": { "min_playlist_length": 5, "pick_range": "legacy" } }"#,
        )
        .unwrap();

        assert_eq!(config.game.min_playlist_length, 5);
        assert_eq!(config.game.pick_range, PickRange::Legacy);
        assert_eq!(config.game.lookup_timeout(), Duration::from_secs(5));
        assert_eq!(config.catalog.results, 200);
        assert_eq!(config.catalog.playlist_type, "artist-radio");
    }

    #[test]
    fn catalog_type_is_read_from_type_key() {
        let config =
            AppConfig::from_json(r#"{ "catalog": { "type": "song-radio", "api_key": "k" } }"#)
                .unwrap();

        assert_eq!(config.catalog.playlist_type, "song-radio");
        assert_eq!(config.catalog.api_key.as_deref(), Some("k"));
        assert_eq!(config.catalog.format, "json");
    }

    #[test]
    fn unknown_pick_range_is_rejected() {
        assert!(AppConfig::from_json(r#"{ "game": { "pick_range": "sideways" } }"#).is_err());
    }
}
