//! Access tokens are handed out once and only their digest is persisted.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng as _};
use sha2::{Digest as _, Sha256};

const TOKEN_LENGTH: usize = 64;
const CONFERENCE_KEY_LENGTH: usize = 16;

fn random_alphanumeric(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[must_use]
pub fn generate_token() -> String {
    random_alphanumeric(TOKEN_LENGTH)
}

/// The key a provider knows a conference by.
#[must_use]
pub fn generate_conference_key() -> String {
    random_alphanumeric(CONFERENCE_KEY_LENGTH)
}

/// Lowercase hex SHA-256 of the token.
#[must_use]
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
