//! Session Token minting and verification.
//!
//! Unlike a static configured bearer token, this is a signed,
//! self-describing token built on `jsonwebtoken`, carrying
//! `user_id`/`issued_at`/`expires_at` claims so verification stays
//! stateless.

use amtbrief_core::ApiError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — the user id (`telegram_<n>` / `google_<sub>`).
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints a bearer Session Token for `user_id`, valid for `ttl_secs`.
pub fn mint(user_id: &str, secret: &str, ttl_secs: i64) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to mint session token: {e}")))
}

/// Verifies a bearer Session Token, returning the embedded user id.
///
/// Stateless: expiry and signature are the only checks.
pub fn verify(token: &str, secret: &str) -> Result<String, ApiError> {
    let validation = Validation::default();
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| ApiError::Unauthenticated)?;

    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips() {
        let token = mint("telegram_42", "test-secret", 3600).unwrap();
        let user_id = verify(&token, "test-secret").unwrap();
        assert_eq!(user_id, "telegram_42");
    }

    #[test]
    fn wrong_secret_is_unauthenticated() {
        let token = mint("telegram_42", "right-secret", 3600).unwrap();
        let err = verify(&token, "wrong-secret").unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let token = mint("telegram_42", "test-secret", -10).unwrap();
        let err = verify(&token, "test-secret").unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }
}
