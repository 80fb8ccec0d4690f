use chrono::Utc;
use rusqlite::Connection;

use crate::error::{Result, UserError};
use crate::types::User;
use amtbrief_core::types::Language;
use amtbrief_identity::NormalizedIdentity;

/// Creates a User on first sight, or refreshes mutable profile fields on
/// re-login without changing `id`.
///
/// Idempotent on stable normalized input: calling twice with the same
/// identity produces the same record except `last_login_at`.
pub fn upsert_user(conn: &Connection, identity: &NormalizedIdentity) -> Result<User> {
    let now = Utc::now().to_rfc3339();

    if let Some(existing) = crate::db::get_user(conn, &identity.id)? {
        crate::db::touch_user_login(
            conn,
            &identity.id,
            &identity.display_name,
            identity.picture_url.as_deref(),
            &now,
        )?;
        return Ok(User {
            display_name: identity.display_name.clone(),
            picture_url: identity.picture_url.clone(),
            last_login_at: now,
            ..existing
        });
    }

    let preferred_language = identity
        .preferred_language_hint
        .as_deref()
        .and_then(|code| code.split('-').next())
        .and_then(|code| code.parse::<Language>().ok())
        .unwrap_or(Language::En);

    let user = User {
        id: identity.id.clone(),
        email: identity.email.clone(),
        display_name: identity.display_name.clone(),
        picture_url: identity.picture_url.clone(),
        oauth_provider: identity.oauth_provider,
        preferred_language,
        api_key_slot_1: None,
        api_key_slot_2: None,
        api_key_slot_3: None,
        created_at: now.clone(),
        last_login_at: now,
    };

    crate::db::insert_user_row(conn, &user).map_err(UserError::DatabaseError)?;
    Ok(user)
}

pub fn get_user(conn: &Connection, user_id: &str) -> Result<User> {
    crate::db::get_user(conn, user_id)?.ok_or_else(|| UserError::NotFound(user_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amtbrief_core::types::OAuthProvider;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        conn
    }

    fn identity() -> NormalizedIdentity {
        NormalizedIdentity {
            id: "telegram_42".to_string(),
            email: "42@telegram.local".to_string(),
            display_name: "Anna".to_string(),
            picture_url: None,
            oauth_provider: OAuthProvider::ChatLike,
            preferred_language_hint: None,
        }
    }

    #[test]
    fn upsert_creates_then_updates_in_place() {
        let conn = conn();
        let first = upsert_user(&conn, &identity()).unwrap();
        assert_eq!(first.id, "telegram_42");

        let mut second_identity = identity();
        second_identity.display_name = "Anna B.".to_string();
        let second = upsert_user(&conn, &second_identity).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.display_name, "Anna B.");
    }
}
