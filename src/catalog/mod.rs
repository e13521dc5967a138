//! Third-party music metadata: artist playlists and preview clip lookup.

pub mod http;

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::http::HttpCatalogClient;

/// Result alias for catalog lookups.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A candidate song as returned by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Name of the performing artist.
    pub artist_name: String,
    /// Song title.
    pub title: String,
}

impl Track {
    /// Convenience constructor.
    pub fn new(artist_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist_name: artist_name.into(),
            title: title.into(),
        }
    }
}

/// Failures raised while talking to the metadata or preview providers.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Building the HTTP client failed.
    #[error("failed to build catalog HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or the connection dropped.
    #[error("request to `{endpoint}` failed")]
    Unavailable {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("`{endpoint}` answered with status {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    /// The body could not be decoded as JSON.
    #[error("failed to decode response from `{endpoint}`")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The body decoded but did not have the expected shape.
    #[error("malformed response from `{endpoint}`: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: &'static str,
    },
    /// No search result matched the requested title.
    #[error("no track named `{title}` by `{artist}`")]
    NoMatch { artist: String, title: String },
    /// A matching track exists but has no preview clip.
    #[error("no preview available for `{title}` by `{artist}`")]
    NoPreview { artist: String, title: String },
    /// The lookup did not complete in time.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}

impl CatalogError {
    /// True when the provider answered but the payload is unusable, as opposed
    /// to a transport level failure worth retrying later.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CatalogError::Decode { .. } | CatalogError::Malformed { .. }
        )
    }
}

/// Abstraction over the two external providers used by the game.
pub trait CatalogClient: Send + Sync {
    /// Fetch the candidate tracks generated for `artist`.
    fn fetch_artist_catalog(
        &self,
        artist: &str,
    ) -> BoxFuture<'static, CatalogResult<Vec<Track>>>;
    /// Resolve a playable preview URL for the given song.
    fn fetch_preview_url(
        &self,
        artist: &str,
        title: &str,
    ) -> BoxFuture<'static, CatalogResult<String>>;
}
