//! API Middleware
//!
//! Request authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{parse_basic_credentials, verify_dummy, verify_password, AuthUser, TokenType};
use crate::error::AppError;
use crate::store::UserStore;

use super::AppState;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_CREDENTIALS: &str = "Invalid or expired token.";

// =========================================================================
// Authentication Middleware
// =========================================================================

/// Resolve the caller from the Authorization header and stash an
/// [`AuthUser`] in the request extensions. `Bearer` carries an access
/// token, `Basic` carries username and password.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let header = match headers.get("Authorization").and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => {
            return Err(AppError::Unauthorized(MISSING_CREDENTIALS).into_response());
        }
    };

    let user = if let Some(token) = header.strip_prefix("Bearer ") {
        bearer_user(&state, token.trim()).await
    } else {
        basic_user(&state, header).await
    };

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS).into_response());
        }
        Err(e) => {
            return Err(AppError::Database(e).into_response());
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Access-token path. The token must decode, carry the access type, and
/// name a user that still exists.
async fn bearer_user(state: &AppState, token: &str) -> Result<Option<AuthUser>, sqlx::Error> {
    let Ok(claims) = state.jwt.validate_token_of_type(token, TokenType::Access) else {
        return Ok(None);
    };

    let user = UserStore::new(state.pool.clone())
        .find_by_id(claims.sub)
        .await?;
    Ok(user.map(|u| AuthUser {
        id: u.id,
        username: u.username,
    }))
}

/// Basic-credentials path, kept for scripted clients.
async fn basic_user(state: &AppState, header: &str) -> Result<Option<AuthUser>, sqlx::Error> {
    let Some((username, password)) = parse_basic_credentials(header) else {
        return Ok(None);
    };

    let store = UserStore::new(state.pool.clone());
    match store.find_by_username(&username).await? {
        Some(user) if verify_password(&password, &user.password_hash) => Ok(Some(AuthUser {
            id: user.id,
            username: user.username,
        })),
        Some(_) => Ok(None),
        None => {
            // Same work whether or not the username exists.
            verify_dummy(&password);
            Ok(None)
        }
    }
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    // Mask sensitive headers
    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    // Log request
    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        headers = ?headers,
        "Incoming request"
    );

    // Process request
    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    // Log response
    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer secret-token".parse().unwrap());
        headers.insert("cookie", "session=abc123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let authorization = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let cookie = masked.iter().find(|(k, _)| k == "cookie");

        assert_eq!(authorization.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(cookie.unwrap().1, "[REDACTED]");
    }

    #[test]
    fn test_sensitive_headers_list() {
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(SENSITIVE_HEADERS.contains(&"cookie"));
        assert!(!SENSITIVE_HEADERS.contains(&"content-type"));
    }
}
