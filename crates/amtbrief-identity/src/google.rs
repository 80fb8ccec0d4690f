//! GoogleLike identity assertion verification.
//!
//! Verifies an inbound Google-issued ID token against Google's published
//! JWKS using `jsonwebtoken`.

use crate::error::{IdentityError, Result};
use crate::types::NormalizedIdentity;
use amtbrief_core::types::OAuthProvider;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: &[&str] = &["https://accounts.google.com", "accounts.google.com"];

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

/// Verifies `credential` (a Google-issued ID token) against Google's public
/// keys and the configured OAuth client id, returning a normalized identity.
pub async fn verify(credential: &str, client_id: Option<&str>) -> Result<NormalizedIdentity> {
    let client_id = client_id.ok_or(IdentityError::Unconfigured)?;

    let header = decode_header(credential)
        .map_err(|e| IdentityError::InvalidPayload(format!("malformed credential: {e}")))?;
    let kid = header
        .kid
        .ok_or_else(|| IdentityError::InvalidPayload("credential missing kid".into()))?;

    let jwks = fetch_jwks()
        .await
        .map_err(|e| IdentityError::Rejected(format!("could not fetch Google JWKS: {e}")))?;

    let key = jwks
        .keys
        .iter()
        .find(|k| k.kid == kid)
        .ok_or_else(|| IdentityError::Rejected("no matching Google signing key".into()))?;

    let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
        .map_err(|e| IdentityError::Rejected(format!("invalid Google signing key: {e}")))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[client_id]);
    validation.set_issuer(GOOGLE_ISSUERS);

    let token_data = decode::<GoogleClaims>(credential, &decoding_key, &validation)
        .map_err(|e| IdentityError::Rejected(format!("signature verification failed: {e}")))?;

    let claims = token_data.claims;
    let email = claims
        .email
        .ok_or_else(|| IdentityError::InvalidPayload("credential missing email".into()))?;

    Ok(NormalizedIdentity {
        id: format!("google_{}", claims.sub),
        email,
        display_name: claims.name.unwrap_or_default(),
        picture_url: claims.picture,
        oauth_provider: OAuthProvider::GoogleLike,
        preferred_language_hint: None,
    })
}

async fn fetch_jwks() -> std::result::Result<Jwks, reqwest::Error> {
    reqwest::get(GOOGLE_JWKS_URL).await?.json::<Jwks>().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_client_id_is_unconfigured() {
        let err = verify("whatever", None).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unconfigured));
    }

    #[tokio::test]
    async fn malformed_credential_is_invalid_payload() {
        let err = verify("not-a-jwt", Some("client-id")).await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidPayload(_)));
    }
}
