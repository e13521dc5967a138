use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::UserEntity, storage::StorageError},
    dto::user::{ChangePasswordRequest, CreateUserRequest, LoginRequest, PublicUser},
    error::ServiceError,
    services::passwords::{generate_salt, hash_password, verify_password},
    state::SharedState,
};

/// Register a new user with a freshly salted password hash.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<PublicUser, ServiceError> {
    let store = state.require_store().await?;
    let CreateUserRequest {
        username,
        password,
        email,
    } = request;
    let email = email.filter(|email| !email.trim().is_empty());

    if store.find_user_by_username(&username).await?.is_some() {
        return Err(ServiceError::UsernameTaken { username });
    }
    if let Some(email) = &email {
        if store.find_user_by_email(email).await?.is_some() {
            return Err(ServiceError::EmailTaken {
                email: email.clone(),
            });
        }
    }

    let salt = generate_salt();
    let user = UserEntity {
        id: Uuid::new_v4(),
        password_hash: hash_password(&salt, &password),
        salt,
        username,
        email,
        created_at: SystemTime::now(),
    };
    store
        .insert_user(user.clone())
        .await
        .map_err(|err| registration_conflict(err, &user))?;
    info!(user_id = %user.id, username = %user.username, "user created");

    Ok(user.into())
}

pub async fn username_available(state: &SharedState, username: &str) -> Result<bool, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.find_user_by_username(username).await?.is_none())
}

/// Check credentials and return the matching user.
pub async fn login(state: &SharedState, request: LoginRequest) -> Result<PublicUser, ServiceError> {
    let user = authenticate(state, &request.username, &request.password).await?;
    Ok(user.into())
}

/// Replace the password after verifying the current one.
pub async fn change_password(
    state: &SharedState,
    request: ChangePasswordRequest,
) -> Result<(), ServiceError> {
    let mut user = authenticate(state, &request.username, &request.password).await?;

    let salt = generate_salt();
    user.password_hash = hash_password(&salt, &request.new_password);
    user.salt = salt;

    let store = state.require_store().await?;
    store.update_user(user).await?;
    info!(username = %request.username, "password changed");
    Ok(())
}

pub async fn get_user(state: &SharedState, id: Uuid) -> Result<PublicUser, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_user_by_id(id)
        .await?
        .map(Into::into)
        .ok_or(ServiceError::UserNotFound)
}

/// A registration that lost a race with another one surfaces as a storage conflict.
fn registration_conflict(err: StorageError, user: &UserEntity) -> ServiceError {
    match err {
        StorageError::Conflict { field: "email" } => ServiceError::EmailTaken {
            email: user.email.clone().unwrap_or_default(),
        },
        StorageError::Conflict { .. } => ServiceError::UsernameTaken {
            username: user.username.clone(),
        },
        other => other.into(),
    }
}

async fn authenticate(
    state: &SharedState,
    username: &str,
    password: &str,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let Some(user) = store.find_user_by_username(username).await? else {
        return Err(ServiceError::UnknownUser {
            username: username.to_owned(),
        });
    };

    if !verify_password(&user.salt, password, &user.password_hash) {
        return Err(ServiceError::WrongPassword);
    }
    Ok(user)
}
