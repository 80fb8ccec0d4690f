//! ChatLike identity normalization and `initData` HMAC verification,
//! per the chat platform's documented two-stage `WebAppData` scheme.

use crate::error::{IdentityError, Result};
use crate::types::{ChatLoginPayload, NormalizedIdentity, RawChatUser};
use amtbrief_core::types::OAuthProvider;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Reject `initData` payloads whose `auth_date` is older than this.
const MAX_INITDATA_AGE_SECS: i64 = 24 * 3600;

/// Normalizes one of the three accepted ChatLike shapes into a
/// [`NormalizedIdentity`], verifying `initData`'s HMAC signature when that
/// shape is used.
pub fn normalize(payload: &ChatLoginPayload, bot_secret: Option<&str>) -> Result<NormalizedIdentity> {
    let bot_secret = bot_secret.ok_or(IdentityError::Unconfigured)?;

    let raw_user = match payload {
        ChatLoginPayload::Nested { user } => user.clone(),
        ChatLoginPayload::Flat(user) => user.clone(),
        ChatLoginPayload::InitData { init_data } => extract_user_from_init_data(init_data, bot_secret)?,
    };

    build_identity(raw_user)
}

fn build_identity(raw: RawChatUser) -> Result<NormalizedIdentity> {
    let id = raw
        .id
        .ok_or_else(|| IdentityError::InvalidPayload("missing id".into()))?;

    let first_name = raw.first_name.unwrap_or_default();
    if first_name.trim().is_empty() {
        return Err(IdentityError::InvalidPayload("missing first_name".into()));
    }

    let display_name = match raw.last_name {
        Some(last) if !last.trim().is_empty() => format!("{first_name} {last}"),
        _ => first_name,
    };

    Ok(NormalizedIdentity {
        id: format!("telegram_{id}"),
        email: format!("{id}@telegram.local"),
        display_name,
        picture_url: raw.photo_url,
        oauth_provider: OAuthProvider::ChatLike,
        preferred_language_hint: raw.language_code,
    })
}

/// Parses and HMAC-verifies a URL-encoded `initData` string, returning the
/// embedded `user` object as a [`RawChatUser`].
fn extract_user_from_init_data(init_data: &str, bot_secret: &str) -> Result<RawChatUser> {
    let pairs = parse_query_pairs(init_data);

    let hash = pairs
        .iter()
        .find(|(k, _)| k == "hash")
        .map(|(_, v)| v.clone())
        .ok_or_else(|| IdentityError::InvalidPayload("initData missing hash".into()))?;

    let auth_date: i64 = pairs
        .iter()
        .find(|(k, _)| k == "auth_date")
        .and_then(|(_, v)| v.parse().ok())
        .ok_or_else(|| IdentityError::InvalidPayload("initData missing auth_date".into()))?;

    verify_init_data_hmac(&pairs, &hash, bot_secret)?;

    let now = chrono::Utc::now().timestamp();
    if now - auth_date > MAX_INITDATA_AGE_SECS {
        return Err(IdentityError::Rejected("initData is stale (> 24h)".into()));
    }

    let user_json = pairs
        .iter()
        .find(|(k, _)| k == "user")
        .map(|(_, v)| v.clone())
        .ok_or_else(|| IdentityError::InvalidPayload("initData missing user".into()))?;

    serde_json::from_str(&user_json)
        .map_err(|e| IdentityError::InvalidPayload(format!("initData user field: {e}")))
}

fn parse_query_pairs(init_data: &str) -> Vec<(String, String)> {
    init_data
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((
                urlencoding::decode(key).ok()?.into_owned(),
                urlencoding::decode(value).ok()?.into_owned(),
            ))
        })
        .collect()
}

/// Verifies `hash` against the data-check-string built from every field
/// except `hash` itself, per the platform's documented two-stage HMAC:
/// `secret_key = HMAC-SHA256(key="WebAppData", data=bot_token)`, then
/// `expected = HMAC-SHA256(key=secret_key, data=data_check_string)`.
fn verify_init_data_hmac(pairs: &[(String, String)], hash: &str, bot_secret: &str) -> Result<()> {
    let mut fields: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| k != "hash").collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let data_check_string = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut stage1 = HmacSha256::new_from_slice(b"WebAppData")
        .map_err(|_| IdentityError::Rejected("invalid bot secret length".into()))?;
    stage1.update(bot_secret.as_bytes());
    let secret_key = stage1.finalize().into_bytes();

    let mut stage2 = HmacSha256::new_from_slice(&secret_key)
        .map_err(|_| IdentityError::Rejected("invalid derived key length".into()))?;
    stage2.update(data_check_string.as_bytes());

    let expected = hex::decode(hash)
        .map_err(|_| IdentityError::InvalidPayload("hash is not valid hex".into()))?;

    stage2
        .verify_slice(&expected)
        .map_err(|_| IdentityError::Rejected("initData HMAC mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(bot_secret: &str, data_check_string: &str) -> String {
        let mut stage1 = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        stage1.update(bot_secret.as_bytes());
        let secret_key = stage1.finalize().into_bytes();

        let mut stage2 = HmacSha256::new_from_slice(&secret_key).unwrap();
        stage2.update(data_check_string.as_bytes());
        hex::encode(stage2.finalize().into_bytes())
    }

    #[test]
    fn flat_shape_accepted() {
        let payload = ChatLoginPayload::Flat(RawChatUser {
            id: Some(987654321),
            first_name: Some("Анна".into()),
            ..Default::default()
        });
        let identity = normalize(&payload, Some("secret")).unwrap();
        assert_eq!(identity.id, "telegram_987654321");
        assert_eq!(identity.email, "987654321@telegram.local");
    }

    #[test]
    fn missing_id_is_invalid_payload() {
        let payload = ChatLoginPayload::Flat(RawChatUser {
            first_name: Some("Anna".into()),
            ..Default::default()
        });
        let err = normalize(&payload, Some("secret")).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidPayload(_)));
    }

    #[test]
    fn empty_first_name_is_invalid_payload() {
        let payload = ChatLoginPayload::Flat(RawChatUser {
            id: Some(42),
            first_name: Some("".into()),
            ..Default::default()
        });
        let err = normalize(&payload, Some("secret")).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidPayload(_)));
    }

    #[test]
    fn missing_bot_secret_is_unconfigured() {
        let payload = ChatLoginPayload::Flat(RawChatUser {
            id: Some(42),
            first_name: Some("A".into()),
            ..Default::default()
        });
        let err = normalize(&payload, None).unwrap_err();
        assert!(matches!(err, IdentityError::Unconfigured));
    }

    #[test]
    fn init_data_valid_hmac_is_accepted() {
        let bot_secret = "test-bot-token";
        let user_json = r#"{"id":42,"first_name":"A"}"#;
        let auth_date = chrono::Utc::now().timestamp();
        let data_check_string = format!("auth_date={auth_date}\nuser={user_json}");
        let hash = sign(bot_secret, &data_check_string);

        let init_data = format!(
            "auth_date={auth_date}&user={}&hash={hash}",
            urlencoding::encode(user_json)
        );
        let payload = ChatLoginPayload::InitData { init_data };
        let identity = normalize(&payload, Some(bot_secret)).unwrap();
        assert_eq!(identity.id, "telegram_42");
    }

    #[test]
    fn init_data_bad_hash_is_rejected() {
        let bot_secret = "test-bot-token";
        let user_json = r#"{"id":42,"first_name":"A"}"#;
        let auth_date = chrono::Utc::now().timestamp();
        let init_data = format!(
            "auth_date={auth_date}&user={}&hash=deadbeef",
            urlencoding::encode(user_json)
        );
        let payload = ChatLoginPayload::InitData { init_data };
        let err = normalize(&payload, Some(bot_secret)).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidPayload(_)) || matches!(err, IdentityError::Rejected(_)));
    }

    #[test]
    fn init_data_stale_is_rejected() {
        let bot_secret = "test-bot-token";
        let user_json = r#"{"id":42,"first_name":"A"}"#;
        let auth_date = chrono::Utc::now().timestamp() - 25 * 3600;
        let data_check_string = format!("auth_date={auth_date}\nuser={user_json}");
        let hash = sign(bot_secret, &data_check_string);

        let init_data = format!(
            "auth_date={auth_date}&user={}&hash={hash}",
            urlencoding::encode(user_json)
        );
        let payload = ChatLoginPayload::InitData { init_data };
        let err = normalize(&payload, Some(bot_secret)).unwrap_err();
        assert!(matches!(err, IdentityError::Rejected(_)));
    }
}
