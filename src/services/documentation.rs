use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Name That Song backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::playlist::generate_playlist,
        crate::routes::song::random_song,
        crate::routes::song::song_counts,
        crate::routes::song::guess_song,
        crate::routes::user::create_user,
        crate::routes::user::login,
        crate::routes::user::username_available,
        crate::routes::user::change_password,
        crate::routes::user::get_user,
        crate::routes::room::create_room,
        crate::routes::room::retrieve_room,
        crate::routes::room::update_room,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::PlaylistCountsResponse,
            crate::dto::game::NextSongResponse,
            crate::dto::game::GuessRequest,
            crate::dto::game::GuessResponse,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::LoginRequest,
            crate::dto::user::ChangePasswordRequest,
            crate::dto::user::PublicUser,
            crate::dto::user::AvailabilityResponse,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::RoomUpdateRequest,
            crate::dto::room::RoomResponse,
            crate::dto::room::RoomSummary,
            crate::dto::room::RoomMemberSummary,
            crate::error::ErrorBody,
            crate::error::RetryHint,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Playlist generation and song draws"),
        (name = "users", description = "Player accounts"),
        (name = "rooms", description = "Multiplayer rooms"),
    )
)]
pub struct ApiDoc;
