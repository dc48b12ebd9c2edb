/// Opaque bearer token utilities
///
/// Tokens are random strings handed to the client once at login. Only their
/// SHA-256 digest is persisted, so a leaked `personal_access_tokens` table
/// cannot be replayed.
///
/// # Token Format
///
/// `tareas_{40 chars}` (47 chars total)
/// - Prefix: "tareas_" (7 chars)
/// - Random part: 40 alphanumeric chars (base62: [A-Za-z0-9])
///
/// # Example
///
/// ```
/// use tareas_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, digest) = generate_token();
/// assert!(token.starts_with("tareas_"));
/// assert!(validate_token_format(&token));
/// assert_eq!(hash_token(&token), digest);
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_RANDOM_LENGTH: usize = 40;

const TOKEN_PREFIX: &str = "tareas_";

/// Total length of a token (prefix + random)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new bearer token
///
/// # Returns
///
/// Tuple of (plaintext_token, sha256_hex_digest). Only the digest should be
/// stored.
///
/// Key space is 62^40, roughly 2^238.
pub fn generate_token() -> (String, String) {
    let token = format!("{}{}", TOKEN_PREFIX, random_base62(TOKEN_RANDOM_LENGTH));
    let digest = hash_token(&token);

    (token, digest)
}

fn random_base62(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hex-encoded SHA-256 digest of a token (64 characters)
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check run before any store lookup
///
/// # Example
///
/// ```
/// use tareas_shared::auth::token::validate_token_format;
///
/// assert!(validate_token_format("tareas_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMN"));
/// assert!(!validate_token_format("tareas_short"));
/// assert!(!validate_token_format("wrong_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNO"));
/// ```
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}
