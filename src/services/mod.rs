/// OpenAPI documentation generation.
pub mod documentation;
/// Playlist generation, song draws and guesses.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Salted password hashing.
pub mod passwords;
/// Room lifecycle: creation, lookup, join and leave.
pub mod room_service;
/// Document store connection supervisor.
pub mod storage_supervisor;
/// User accounts and credentials.
pub mod user_service;
