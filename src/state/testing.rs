//! Deterministic collaborators shared by unit tests.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
    time::Duration,
};

use futures::future::BoxFuture;
use reqwest::StatusCode;

use super::picker::IndexPicker;
use crate::catalog::{CatalogClient, CatalogError, CatalogResult, Track};

/// Picker replaying a fixed script, then answering `low` (or a repeated value).
pub struct ScriptedPicker {
    script: Mutex<VecDeque<usize>>,
    repeat: Option<usize>,
    calls: Mutex<Vec<(usize, usize)>>,
}

impl ScriptedPicker {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            repeat: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(value: usize) -> Self {
        Self {
            repeat: Some(value),
            ..Self::new([])
        }
    }

    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl IndexPicker for ScriptedPicker {
    fn pick(&self, low: usize, high: usize) -> usize {
        self.calls.lock().unwrap().push((low, high));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .or(self.repeat)
            .unwrap_or(low)
    }
}

enum CatalogReply {
    Tracks(Vec<Track>),
    Unavailable,
    Malformed,
}

/// In-memory stand-in for the metadata and preview providers.
#[derive(Default)]
pub struct FakeCatalog {
    catalogs: HashMap<String, CatalogReply>,
    failing_titles: HashSet<String>,
    slow_titles: HashMap<String, Duration>,
    lookups: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `titles` (one track per entry) for `artist`.
    pub fn with_artist(mut self, artist: &str, titles: &[&str]) -> Self {
        let tracks = titles.iter().map(|title| Track::new(artist, *title)).collect();
        self.catalogs
            .insert(artist.to_lowercase(), CatalogReply::Tracks(tracks));
        self
    }

    pub fn with_unavailable_artist(mut self, artist: &str) -> Self {
        self.catalogs
            .insert(artist.to_lowercase(), CatalogReply::Unavailable);
        self
    }

    pub fn with_malformed_artist(mut self, artist: &str) -> Self {
        self.catalogs
            .insert(artist.to_lowercase(), CatalogReply::Malformed);
        self
    }

    /// Preview lookups for these titles fail.
    pub fn failing(mut self, titles: &[&str]) -> Self {
        self.failing_titles
            .extend(titles.iter().map(|title| title.to_string()));
        self
    }

    /// Preview lookups for `title` take `delay` before succeeding.
    pub fn slow(mut self, title: &str, delay: Duration) -> Self {
        self.slow_titles.insert(title.to_string(), delay);
        self
    }

    /// Titles looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl CatalogClient for FakeCatalog {
    fn fetch_artist_catalog(
        &self,
        artist: &str,
    ) -> BoxFuture<'static, CatalogResult<Vec<Track>>> {
        let result = match self.catalogs.get(&artist.to_lowercase()) {
            Some(CatalogReply::Tracks(tracks)) => Ok(tracks.clone()),
            Some(CatalogReply::Unavailable) => Err(CatalogError::Status {
                endpoint: "playlist",
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
            Some(CatalogReply::Malformed) | None => Err(CatalogError::Malformed {
                endpoint: "playlist",
                reason: "missing `response.songs` list",
            }),
        };
        Box::pin(async move { result })
    }

    fn fetch_preview_url(
        &self,
        artist: &str,
        title: &str,
    ) -> BoxFuture<'static, CatalogResult<String>> {
        self.lookups.lock().unwrap().push(title.to_string());

        let delay = self.slow_titles.get(title).copied();
        let result = if self.failing_titles.contains(title) {
            Err(CatalogError::NoPreview {
                artist: artist.to_string(),
                title: title.to_string(),
            })
        } else {
            Ok(format!("https://previews.test/{title}"))
        };

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}
