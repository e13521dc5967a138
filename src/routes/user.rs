use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::user::{
        AvailabilityResponse, ChangePasswordRequest, CreateUserRequest, LoginRequest, PublicUser,
    },
    error::AppError,
    services::user_service,
    state::SharedState,
};

/// Account management routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/user/create", post(create_user))
        .route("/api/user/login", post(login))
        .route("/api/user/available/{username}", get(username_available))
        .route("/api/user/password/change", put(change_password))
        .route("/api/user/{id}", get(get_user))
}

/// Register a new player.
#[utoipa::path(
    post,
    path = "/api/user/create",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = PublicUser),
        (status = 400, description = "Invalid username, password or email"),
        (status = 409, description = "Username or email taken", body = crate::error::ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateUserRequest>>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(user_service::create_user(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = PublicUser),
        (status = 401, description = "Wrong password", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown username", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LoginRequest>>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(user_service::login(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/user/available/{username}",
    tag = "users",
    params(("username" = String, Path, description = "Username to check")),
    responses((status = 200, description = "Availability", body = AvailabilityResponse))
)]
pub async fn username_available(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available = user_service::username_available(&state, &username).await?;
    Ok(Json(AvailabilityResponse { available }))
}

#[utoipa::path(
    put,
    path = "/api/user/password/change",
    tag = "users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Wrong current password", body = crate::error::ErrorBody)
    )
)]
pub async fn change_password(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ChangePasswordRequest>>,
) -> Result<StatusCode, AppError> {
    user_service::change_password(&state, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/user/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Identifier of the user")),
    responses(
        (status = 200, description = "User", body = PublicUser),
        (status = 404, description = "User not found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(user_service::get_user(&state, id).await?))
}
