//! Salted password hashing.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use sha2::{Digest, Sha512};

/// Fresh salt: the current time in milliseconds followed by 8 random bytes as hex.
pub fn generate_salt() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let noise: [u8; 8] = rand::rng().random();
    format!("{millis}{}", hex::encode(noise))
}

/// Hex encoded `sha512(salt + password)`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    hash_password(salt, password) == expected_hash
}
