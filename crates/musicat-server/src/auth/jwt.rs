//! Bearer tokens. Tokens are issued by the account service; this server only
//! validates them, but can mint access tokens for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Login
    pub username: String,
    /// Role at issue time (user, moderator, admin)
    pub role: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Access tokens live 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 900;

pub fn generate_token(
    user_id: Uuid,
    username: &str,
    role: &str,
    token_type: TokenType,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let ttl = match token_type {
        TokenType::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        TokenType::Refresh => Duration::days(7),
    };
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role: role.to_string(),
        token_type,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_access_token(
    user_id: Uuid,
    username: &str,
    role: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    generate_token(user_id, username, role, TokenType::Access, secret)
}

/// Validate a JWT token and return claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt";

    #[test]
    fn test_access_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, "alice", "moderator", SECRET).unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "moderator");
        assert_eq!(claims.token_type, TokenType::Access);
        let diff = claims.exp - claims.iat;
        assert!((899..=901).contains(&diff));
    }

    #[test]
    fn test_refresh_token_type_preserved() {
        let token =
            generate_token(Uuid::new_v4(), "bob", "user", TokenType::Refresh, SECRET).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!((604799..=604801).contains(&(claims.exp - claims.iat)));
    }

    #[test]
    fn test_invalid_secret_rejects_token() {
        let token = generate_access_token(Uuid::new_v4(), "user1", "user", SECRET).unwrap();
        assert!(validate_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_token("not-a-valid-jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn test_token_type_serialization() {
        let json = serde_json::to_string(&TokenType::Access).unwrap();
        assert_eq!(json, "\"access\"");
        let json = serde_json::to_string(&TokenType::Refresh).unwrap();
        assert_eq!(json, "\"refresh\"");
    }
}
