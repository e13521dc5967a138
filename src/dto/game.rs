use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::{DrawnSong, PlaylistCounts};

/// Size of the current playlist and how many songs remain unplayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCountsResponse {
    pub playlist_length: usize,
    pub songs_left: usize,
}

impl From<PlaylistCounts> for PlaylistCountsResponse {
    fn from(value: PlaylistCounts) -> Self {
        Self {
            playlist_length: value.playlist_length,
            songs_left: value.songs_left,
        }
    }
}

/// Song served to the players.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextSongResponse {
    /// Preview clip to play.
    pub url: String,
    pub artist: String,
    pub title: String,
    pub playlist_length: usize,
    pub songs_left: usize,
}

impl From<DrawnSong> for NextSongResponse {
    fn from(value: DrawnSong) -> Self {
        Self {
            url: value.preview_url,
            artist: value.track.artist_name,
            title: value.track.title,
            playlist_length: value.counts.playlist_length,
            songs_left: value.counts.songs_left,
        }
    }
}

/// A player's guess for the song currently playing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GuessRequest {
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

/// Verdict for a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GuessResponse {
    pub correct: bool,
    pub score: u32,
}
