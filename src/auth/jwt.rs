//! JWT service for token generation and validation
//!
//! Issues HS256 access/refresh token pairs. The `token_type` claim keeps
//! the two roles apart: the auth middleware accepts only access tokens and
//! the refresh endpoint only refresh tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Errors that can occur when validating or generating tokens
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token is invalid or expired: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Token has wrong type")]
    WrongTokenType,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtService {
    /// Initialize a new JWT service from a shared secret.
    pub fn new(secret: &str, access_lifetime_secs: u64, refresh_lifetime_secs: u64) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_lifetime_secs: access_lifetime_secs as i64,
            refresh_lifetime_secs: refresh_lifetime_secs as i64,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.generate(user_id, self.access_lifetime_secs, TokenType::Access)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.generate(user_id, self.refresh_lifetime_secs, TokenType::Refresh)
    }

    fn generate(
        &self,
        user_id: i64,
        lifetime_secs: i64,
        token_type: TokenType,
    ) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + lifetime_secs,
            token_type,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token's signature and expiry and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and additionally require a specific token type
    pub fn validate_token_of_type(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType);
        }
        Ok(claims)
    }
}
