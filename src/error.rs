use std::fmt;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::{
    catalog::CatalogError,
    dao::storage::StorageError,
    state::{DrawError, PlaylistCounts},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Request did not name an artist.
    #[error("an artist name is required")]
    MissingArtist,
    /// The catalog for `artist` is empty, undersized or unusable.
    #[error("no songs retrieved for artist `{artist}`")]
    NoSongsForArtist { artist: String },
    /// The metadata provider could not be reached.
    #[error("catalog provider unavailable")]
    CatalogUnavailable(#[source] CatalogError),
    /// Drawing the next song failed, with the round's counts at the time of failure.
    #[error("{source}")]
    Draw {
        source: DrawError,
        counts: Option<PlaylistCounts>,
    },
    /// Username already registered.
    #[error("username `{username}` is already taken")]
    UsernameTaken { username: String },
    /// Email already registered.
    #[error("email `{email}` is already registered")]
    EmailTaken { email: String },
    /// Login attempted with an unknown username.
    #[error("no user named `{username}`")]
    UnknownUser { username: String },
    /// Password does not match the stored hash.
    #[error("wrong password")]
    WrongPassword,
    /// User referenced by id does not exist.
    #[error("user not found")]
    UserNotFound,
    /// Room referenced by name or id does not exist.
    #[error("room `{identifier}` not found")]
    RoomNotFound { identifier: String },
    /// Room update with an operation other than join or leave.
    #[error("unknown room operation `{operation}`")]
    UnknownRoomOperation { operation: String },
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<DrawError> for ServiceError {
    fn from(source: DrawError) -> Self {
        ServiceError::Draw {
            source,
            counts: None,
        }
    }
}

impl ServiceError {
    /// Classify a catalog fetch failure for `artist`.
    pub fn from_catalog(artist: &str, err: CatalogError) -> Self {
        if err.is_malformed() {
            ServiceError::NoSongsForArtist {
                artist: artist.to_owned(),
            }
        } else {
            ServiceError::CatalogUnavailable(err)
        }
    }
}

/// Numeric codes shared with the game clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoSongsForArtist,
    NoPlaylist,
    PlaylistExhausted,
    NoPreview,
    UsernameTaken,
    UnknownUser,
    WrongPassword,
    EmailTaken,
    MissingArtist,
    UnknownRoomOperation,
    RoomNotFound,
    UserNotFound,
}

impl ErrorCode {
    /// Wire value of the code.
    pub fn value(self) -> u16 {
        match self {
            ErrorCode::NoSongsForArtist => 1000,
            ErrorCode::NoPlaylist => 1001,
            ErrorCode::PlaylistExhausted => 1002,
            ErrorCode::NoPreview => 1003,
            ErrorCode::UsernameTaken => 1007,
            ErrorCode::UnknownUser => 1008,
            ErrorCode::WrongPassword => 1009,
            ErrorCode::EmailTaken => 1014,
            ErrorCode::MissingArtist => 1016,
            ErrorCode::UnknownRoomOperation => 1021,
            ErrorCode::RoomNotFound => 1022,
            ErrorCode::UserNotFound => 1023,
        }
    }
}

/// What the client should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RetryHint {
    /// Pick a different artist.
    ChangeArtist,
    /// Upstream trouble; try the same request later.
    RetryLater,
    /// Ask for another song.
    RequestNewSong,
}

/// Message, code and hint carried by every [`AppError`].
#[derive(Debug)]
pub struct ErrorDetail {
    message: String,
    code: Option<ErrorCode>,
    hint: Option<RetryHint>,
    counts: Option<PlaylistCounts>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            hint: None,
            counts: None,
        }
    }

    pub fn code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn hint(mut self, hint: RetryHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn counts(mut self, counts: Option<PlaylistCounts>) -> Self {
        self.counts = counts;
        self
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(ErrorDetail::new(format!("validation failed: {}", err)))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(ErrorDetail),
    /// Credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(ErrorDetail),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(ErrorDetail),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(ErrorDetail),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(ErrorDetail),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        let detail = ErrorDetail::new(message);
        match err {
            ServiceError::Unavailable(_) | ServiceError::Degraded => {
                AppError::ServiceUnavailable(detail.hint(RetryHint::RetryLater))
            }
            ServiceError::InvalidInput(_) => AppError::BadRequest(detail),
            ServiceError::MissingArtist => {
                AppError::BadRequest(detail.code(ErrorCode::MissingArtist))
            }
            ServiceError::NoSongsForArtist { .. } => AppError::NotFound(
                detail
                    .code(ErrorCode::NoSongsForArtist)
                    .hint(RetryHint::ChangeArtist),
            ),
            ServiceError::CatalogUnavailable(_) => {
                AppError::ServiceUnavailable(detail.hint(RetryHint::RetryLater))
            }
            ServiceError::Draw { source, counts } => {
                let detail = detail.counts(counts);
                match source {
                    DrawError::NoPlaylist => AppError::NotFound(
                        detail
                            .code(ErrorCode::NoPlaylist)
                            .hint(RetryHint::ChangeArtist),
                    ),
                    DrawError::Exhausted => AppError::ServiceUnavailable(
                        detail
                            .code(ErrorCode::PlaylistExhausted)
                            .hint(RetryHint::ChangeArtist),
                    ),
                    DrawError::NoSongAvailable => AppError::ServiceUnavailable(
                        detail
                            .code(ErrorCode::NoPreview)
                            .hint(RetryHint::ChangeArtist),
                    ),
                    DrawError::RoundReplaced => {
                        AppError::ServiceUnavailable(detail.hint(RetryHint::RequestNewSong))
                    }
                    DrawError::Invariant(violation) => {
                        error!(%violation, "refusing to serve from a corrupted playlist");
                        AppError::Internal(detail)
                    }
                }
            }
            ServiceError::UsernameTaken { .. } => {
                AppError::Conflict(detail.code(ErrorCode::UsernameTaken))
            }
            ServiceError::EmailTaken { .. } => {
                AppError::Conflict(detail.code(ErrorCode::EmailTaken))
            }
            ServiceError::UnknownUser { .. } => {
                AppError::NotFound(detail.code(ErrorCode::UnknownUser))
            }
            ServiceError::WrongPassword => {
                AppError::Unauthorized(detail.code(ErrorCode::WrongPassword))
            }
            ServiceError::UserNotFound => {
                AppError::NotFound(detail.code(ErrorCode::UserNotFound))
            }
            ServiceError::RoomNotFound { .. } => {
                AppError::NotFound(detail.code(ErrorCode::RoomNotFound))
            }
            ServiceError::UnknownRoomOperation { .. } => {
                AppError::BadRequest(detail.code(ErrorCode::UnknownRoomOperation))
            }
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Numeric error code, when the failure has one.
    pub code: Option<u16>,
    pub message: String,
    pub hint: Option<RetryHint>,
    /// Round size when a draw failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_length: Option<usize>,
    /// Songs left when a draw failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs_left: Option<usize>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match self {
            AppError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            AppError::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, detail),
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            AppError::Conflict(detail) => (StatusCode::CONFLICT, detail),
            AppError::ServiceUnavailable(detail) => (StatusCode::SERVICE_UNAVAILABLE, detail),
            AppError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };

        let payload = Json(ErrorBody {
            code: detail.code.map(ErrorCode::value),
            message: detail.message,
            hint: detail.hint,
            playlist_length: detail.counts.map(|counts| counts.playlist_length),
            songs_left: detail.counts.map(|counts| counts.songs_left),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode as UpstreamStatus;

    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn draw_failures_map_to_distinct_statuses() {
        assert_eq!(
            status_of(DrawError::NoPlaylist.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DrawError::Exhausted.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DrawError::NoSongAvailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DrawError::RoundReplaced.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn draw_failure_body_carries_round_counts() {
        let err = ServiceError::Draw {
            source: DrawError::Exhausted,
            counts: Some(PlaylistCounts {
                playlist_length: 3,
                songs_left: 0,
            }),
        };

        let response = AppError::from(err).into_response();
        assert!(response.status().is_server_error());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["code"], 1002);
        assert_eq!(body["hint"], "change_artist");
        assert_eq!(body["playlistLength"], 3);
        assert_eq!(body["songsLeft"], 0);
    }

    #[tokio::test]
    async fn other_failures_omit_counts() {
        let response = AppError::from(ServiceError::WrongPassword).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["code"], 1009);
        assert!(body.get("playlistLength").is_none());
        assert!(body.get("songsLeft").is_none());
    }

    #[test]
    fn malformed_catalog_means_no_songs_for_artist() {
        let err = ServiceError::from_catalog(
            "Nobody",
            CatalogError::Malformed {
                endpoint: "playlist",
                reason: "missing `response.songs` list",
            },
        );
        assert!(matches!(err, ServiceError::NoSongsForArtist { ref artist } if artist == "Nobody"));

        let err = ServiceError::from_catalog(
            "Nobody",
            CatalogError::Status {
                endpoint: "playlist",
                status: UpstreamStatus::BAD_GATEWAY,
            },
        );
        assert!(matches!(err, ServiceError::CatalogUnavailable(_)));
    }

    #[test]
    fn codes_match_client_catalogue() {
        assert_eq!(ErrorCode::NoSongsForArtist.value(), 1000);
        assert_eq!(ErrorCode::PlaylistExhausted.value(), 1002);
        assert_eq!(ErrorCode::UserNotFound.value(), 1023);
    }
}
