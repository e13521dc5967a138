use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

pub mod health;
pub mod playlist;
pub mod room;
pub mod song;
pub mod user;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(playlist::router())
        .merge(song::router())
        .merge(user::router())
        .merge(room::router());

    api_router
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::store::memory::MemoryStore,
        state::{
            AppState,
            testing::{FakeCatalog, ScriptedPicker},
        },
    };

    const TEN: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];

    fn catalog() -> FakeCatalog {
        FakeCatalog::new()
            .with_artist("Daft Punk", &TEN)
            .with_artist("Trio", &["X", "Y", "Z"])
            .with_artist("Nine", &TEN[..9])
            .with_unavailable_artist("Offline")
            .failing(&["D"])
    }

    async fn app() -> Router {
        let state = AppState::new(AppConfig::default(), Arc::new(catalog()));
        state.set_store(Arc::new(MemoryStore::new())).await;
        router(state)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/api-doc/openapi.json", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/song/random").is_some());
    }

    #[tokio::test]
    async fn random_song_without_playlist_is_not_found() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/api/song/random", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1001);
        assert_eq!(body["hint"], "change_artist");
    }

    #[tokio::test]
    async fn undersized_playlist_reports_no_songs_for_artist() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/api/playlist/generate/Nine", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1000);

        let (status, body) = call(&app, Method::GET, "/api/song/random", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1001);
    }

    #[tokio::test]
    async fn upstream_outage_asks_to_retry_later() {
        let app = app().await;

        let (status, body) =
            call(&app, Method::GET, "/api/playlist/generate/Offline", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["hint"], "retry_later");
        assert_eq!(body["code"], Value::Null);
    }

    #[tokio::test]
    async fn evicted_song_is_skipped_transparently() {
        let state = AppState::with_picker(
            AppConfig::default(),
            Arc::new(catalog()),
            Arc::new(ScriptedPicker::new([3, 0])),
        );
        let app = router(state);

        let (status, body) =
            call(&app, Method::GET, "/api/playlist/generate/Daft%20Punk", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"playlistLength": 10, "songsLeft": 10}));

        let (status, body) = call(&app, Method::GET, "/api/song/random", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "A");
        assert_eq!(body["url"], "https://previews.test/A");
        assert_eq!(body["playlistLength"], 9);
        assert_eq!(body["songsLeft"], 8);

        let (_, counts) = call(&app, Method::GET, "/api/song/counts", None).await;
        assert_eq!(counts, json!({"playlistLength": 9, "songsLeft": 8}));
    }

    #[tokio::test]
    async fn exhausted_playlist_is_a_server_error_with_counts() {
        let state = AppState::with_picker(
            AppConfig::from_json(r#"{"game": {"min_playlist_length": 3}}"#).unwrap(),
            Arc::new(catalog()),
            Arc::new(ScriptedPicker::new([])),
        );
        let app = router(state);
        call(&app, Method::GET, "/api/playlist/generate/Trio", None).await;

        for _ in 0..3 {
            let (status, _) = call(&app, Method::GET, "/api/song/random", None).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = call(&app, Method::GET, "/api/song/random", None).await;

        assert!(status.is_server_error());
        assert_eq!(body["code"], 1002);
        assert_eq!(body["playlistLength"], 3);
        assert_eq!(body["songsLeft"], 0);
    }

    #[tokio::test]
    async fn guess_is_accepted() {
        let app = app().await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/song/guess",
            Some(json!({"song": "Da Funk", "artist": "Daft Punk"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"correct": true, "score": 1}));
    }

    #[tokio::test]
    async fn user_lifecycle_over_http() {
        let app = app().await;

        let (status, user) = call(
            &app,
            Method::POST,
            "/api/user/create",
            Some(json!({"username": "Alice", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("salt").is_none());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/user/create",
            Some(json!({"username": "alice", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 1007);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/user/login",
            Some(json!({"username": "Alice", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 1009);

        let (_, body) = call(&app, Method::GET, "/api/user/available/ALICE", None).await;
        assert_eq!(body, json!({"available": false}));

        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/user/password/change",
            Some(json!({"username": "Alice", "password": "secret1", "newPassword": "secret2"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let uri = format!("/api/user/{}", user["id"].as_str().unwrap());
        let (status, fetched) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn invalid_registration_is_a_bad_request() {
        let app = app().await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/user/create",
            Some(json!({"username": "Alice", "password": "123"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn room_join_and_unknown_operation() {
        let app = app().await;
        let (_, host) = call(
            &app,
            Method::POST,
            "/api/user/create",
            Some(json!({"username": "Alice", "password": "secret1"})),
        )
        .await;
        let (_, guest) = call(
            &app,
            Method::POST,
            "/api/user/create",
            Some(json!({"username": "Bob", "password": "secret1"})),
        )
        .await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/room",
            Some(json!({"userId": host["id"], "artist": "Daft Punk"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["room"]["roomName"], "alice");
        assert!(body["room"].get("playlist").is_none());

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/room/alice",
            Some(json!({"operation": "join", "userId": guest["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["room"]["users"].as_array().unwrap().len(), 2);

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/room/alice",
            Some(json!({"operation": "dance", "userId": guest["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1021);

        let (status, body) = call(&app, Method::GET, "/api/room/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1022);
    }

    #[tokio::test]
    async fn healthcheck_reports_degraded_without_store() {
        let state = AppState::new(AppConfig::default(), Arc::new(catalog()));
        let app = router(state);

        let (status, body) = call(&app, Method::GET, "/healthcheck", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["playlist_loaded"], false);

        let (status, _) = call(&app, Method::GET, "/api/user/available/alice", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
