use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{CatalogClient, CatalogError, CatalogResult, Track};
use crate::config::CatalogSettings;

const CATALOG_ENDPOINT: &str = "playlist";
const PREVIEW_ENDPOINT: &str = "search";

/// [`CatalogClient`] backed by the HTTP APIs of the metadata and preview providers.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    settings: Arc<CatalogSettings>,
}

impl HttpCatalogClient {
    /// Build the HTTP client; every request carries the configured timeout.
    pub fn new(settings: CatalogSettings) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|source| CatalogError::ClientBuilder { source })?;

        Ok(Self {
            client,
            settings: Arc::new(settings),
        })
    }

    async fn fetch_artist_catalog(&self, artist: String) -> CatalogResult<Vec<Track>> {
        let settings = &self.settings;
        let results = settings.results.to_string();
        let mut query = vec![
            ("artist", artist.as_str()),
            ("format", settings.format.as_str()),
            ("results", results.as_str()),
            ("type", settings.playlist_type.as_str()),
        ];
        if let Some(key) = settings.api_key.as_deref() {
            query.push(("api_key", key));
        }

        debug!(%artist, url = %settings.base_url, "requesting playlist");
        let response = self
            .client
            .get(&settings.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|source| CatalogError::Unavailable {
                endpoint: CATALOG_ENDPOINT,
                source,
            })?;

        let envelope = decode::<PlaylistEnvelope>(response, CATALOG_ENDPOINT).await?;
        let tracks = envelope.into_tracks()?;
        debug!(%artist, tracks = tracks.len(), "received playlist");
        Ok(tracks)
    }

    async fn fetch_preview_url(&self, artist: String, title: String) -> CatalogResult<String> {
        let settings = &self.settings;
        let search = format!("{title} artist:{artist}");
        let query = [("type", "track"), ("q", search.as_str())];

        let mut builder = self.client.get(&settings.preview_base_url).query(&query);
        if let Some(token) = settings.preview_token.as_deref() {
            builder = builder.bearer_auth(token);
        }

        debug!(%artist, %title, "requesting preview url");
        let response = builder
            .send()
            .await
            .map_err(|source| CatalogError::Unavailable {
                endpoint: PREVIEW_ENDPOINT,
                source,
            })?;

        let envelope = decode::<SearchEnvelope>(response, PREVIEW_ENDPOINT).await?;
        select_preview(envelope, &artist, &title)
    }
}

impl CatalogClient for HttpCatalogClient {
    fn fetch_artist_catalog(
        &self,
        artist: &str,
    ) -> BoxFuture<'static, CatalogResult<Vec<Track>>> {
        let client = self.clone();
        let artist = artist.to_owned();
        Box::pin(async move { client.fetch_artist_catalog(artist).await })
    }

    fn fetch_preview_url(
        &self,
        artist: &str,
        title: &str,
    ) -> BoxFuture<'static, CatalogResult<String>> {
        let client = self.clone();
        let artist = artist.to_owned();
        let title = title.to_owned();
        Box::pin(async move { client.fetch_preview_url(artist, title).await })
    }
}

async fn decode<T>(response: reqwest::Response, endpoint: &'static str) -> CatalogResult<T>
where
    T: serde::de::DeserializeOwned,
{
    match response.status() {
        StatusCode::OK => response
            .json::<T>()
            .await
            .map_err(|source| CatalogError::Decode { endpoint, source }),
        status => Err(CatalogError::Status { endpoint, status }),
    }
}

/// `{"response": {"songs": [...]}}` as produced by the playlist endpoint.
#[derive(Debug, Deserialize)]
struct PlaylistEnvelope {
    response: Option<PlaylistBody>,
}

#[derive(Debug, Deserialize)]
struct PlaylistBody {
    songs: Option<Vec<RawSong>>,
}

#[derive(Debug, Deserialize)]
struct RawSong {
    artist_name: String,
    title: String,
}

impl PlaylistEnvelope {
    fn into_tracks(self) -> CatalogResult<Vec<Track>> {
        let Some(body) = self.response else {
            return Err(CatalogError::Malformed {
                endpoint: CATALOG_ENDPOINT,
                reason: "missing `response` object",
            });
        };
        let Some(songs) = body.songs else {
            return Err(CatalogError::Malformed {
                endpoint: CATALOG_ENDPOINT,
                reason: "missing `response.songs` list",
            });
        };

        Ok(songs
            .into_iter()
            .map(|song| Track::new(song.artist_name, song.title))
            .collect())
    }
}

/// `{"tracks": {"items": [...]}}` as produced by the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    tracks: Option<SearchTracks>,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: String,
    #[serde(default)]
    preview_url: Option<String>,
}

/// First item whose name equals `title` (ignoring case) and that carries a preview.
fn select_preview(envelope: SearchEnvelope, artist: &str, title: &str) -> CatalogResult<String> {
    let items = envelope.tracks.map(|tracks| tracks.items).unwrap_or_default();
    let wanted = title.to_uppercase();

    let mut matched = false;
    for item in items {
        if item.name.to_uppercase() != wanted {
            continue;
        }
        matched = true;
        if let Some(url) = item.preview_url.filter(|url| !url.is_empty()) {
            return Ok(url);
        }
    }

    if matched {
        Err(CatalogError::NoPreview {
            artist: artist.to_owned(),
            title: title.to_owned(),
        })
    } else {
        Err(CatalogError::NoMatch {
            artist: artist.to_owned(),
            title: title.to_owned(),
        })
    }
}
