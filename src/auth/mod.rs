//! Authentication
//!
//! Token issuance and validation, password hashing, and the caller
//! identity the handlers consume.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, JwtService, TokenType};
pub use password::{hash_password, verify_dummy, verify_password, PasswordError};

/// Authenticated caller, inserted into request extensions by the auth
/// middleware. Every protected handler reads it from there, so no query
/// can run without an owner.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Split a `Basic` authorization header value into username and password.
/// Returns None for anything that is not well-formed Basic material.
pub fn parse_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = B64.decode(encoded.trim()).ok()?;
    let creds = String::from_utf8(decoded).ok()?;
    let (username, password) = creds.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
