use amtbrief_core::types::{Language, OAuthProvider};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::str::FromStr;

use crate::types::{AnalysisRecord, AppText, LetterRecord, Paging, User};

const USER_SELECT_SQL: &str = "SELECT id, email, display_name, picture_url, oauth_provider,
    preferred_language, api_key_slot_1, api_key_slot_2, api_key_slot_3,
    created_at, last_login_at FROM users";

/// Maps a SELECT row (column order from [`USER_SELECT_SQL`]) to a [`User`].
/// Centralised here so every query in this crate stays consistent.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let oauth_provider = match row.get::<_, String>(4)?.as_str() {
        "google_like" | "google" => OAuthProvider::GoogleLike,
        _ => OAuthProvider::ChatLike,
    };
    let preferred_language = Language::from_str(&row.get::<_, String>(5)?).unwrap_or(Language::En);

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        picture_url: row.get(3)?,
        oauth_provider,
        preferred_language,
        api_key_slot_1: row.get(6)?,
        api_key_slot_2: row.get(7)?,
        api_key_slot_3: row.get(8)?,
        created_at: row.get(9)?,
        last_login_at: row.get(10)?,
    })
}

/// Initializes all tables for the users subsystem. Safe to call on every
/// startup — `CREATE TABLE IF NOT EXISTS` means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_users_table(conn)?;
    create_analyses_table(conn)?;
    create_letters_table(conn)?;
    create_app_text_table(conn)?;
    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY NOT NULL,
            email               TEXT NOT NULL,
            display_name        TEXT NOT NULL,
            picture_url         TEXT,
            oauth_provider      TEXT NOT NULL,
            preferred_language  TEXT NOT NULL DEFAULT 'en',
            api_key_slot_1      TEXT,
            api_key_slot_2      TEXT,
            api_key_slot_3      TEXT,
            created_at          TEXT NOT NULL,
            last_login_at       TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_provider
            ON users (email, oauth_provider);",
    )
}

fn create_analyses_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS analyses (
            id                      TEXT PRIMARY KEY NOT NULL,
            user_id                 TEXT NOT NULL REFERENCES users(id),
            file_name               TEXT NOT NULL,
            file_type               TEXT NOT NULL,
            analysis_language       TEXT NOT NULL,
            llm_provider_used       TEXT NOT NULL,
            llm_model_used          TEXT NOT NULL,
            extracted_text_length   INTEGER NOT NULL,
            analysis_sections       TEXT NOT NULL,
            created_at              TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_analyses_user ON analyses (user_id, created_at);",
    )
}

fn create_letters_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS letters (
            id                  TEXT PRIMARY KEY NOT NULL,
            user_id             TEXT NOT NULL REFERENCES users(id),
            recipient_category  TEXT NOT NULL,
            template_key        TEXT,
            subject             TEXT NOT NULL,
            body_de             TEXT NOT NULL,
            body_translation    TEXT,
            variables_snapshot  TEXT NOT NULL,
            created_at          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_letters_user ON letters (user_id, created_at);",
    )
}

fn create_app_text_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS app_text (
            key         TEXT PRIMARY KEY NOT NULL,
            category    TEXT NOT NULL,
            value       TEXT NOT NULL,
            description TEXT,
            updated_at  TEXT NOT NULL
        );",
    )
}

pub fn get_user(conn: &Connection, id: &str) -> Result<Option<User>> {
    let sql = format!("{USER_SELECT_SQL} WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_user).optional()
}

pub fn find_user_by_email_provider(
    conn: &Connection,
    email: &str,
    oauth_provider: &str,
) -> Result<Option<User>> {
    let sql = format!("{USER_SELECT_SQL} WHERE email = ?1 AND oauth_provider = ?2");
    conn.query_row(&sql, params![email, oauth_provider], row_to_user)
        .optional()
}

pub fn insert_user_row(conn: &Connection, user: &User) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, display_name, picture_url, oauth_provider,
            preferred_language, api_key_slot_1, api_key_slot_2, api_key_slot_3,
            created_at, last_login_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user.id,
            user.email,
            user.display_name,
            user.picture_url,
            provider_label(user.oauth_provider),
            user.preferred_language.as_str(),
            user.api_key_slot_1,
            user.api_key_slot_2,
            user.api_key_slot_3,
            user.created_at,
            user.last_login_at,
        ],
    )?;
    Ok(())
}

/// Refreshes mutable profile fields on re-login; `id` is never changed.
pub fn touch_user_login(
    conn: &Connection,
    id: &str,
    display_name: &str,
    picture_url: Option<&str>,
    last_login_at: &str,
) -> Result<()> {
    conn.execute(
        "UPDATE users SET display_name = ?2, picture_url = ?3, last_login_at = ?4 WHERE id = ?1",
        params![id, display_name, picture_url, last_login_at],
    )?;
    Ok(())
}

pub fn set_key_slot(conn: &Connection, user_id: &str, slot: u8, value: Option<&str>) -> Result<()> {
    let column = match slot {
        1 => "api_key_slot_1",
        2 => "api_key_slot_2",
        3 => "api_key_slot_3",
        _ => return Ok(()),
    };
    let sql = format!("UPDATE users SET {column} = ?2 WHERE id = ?1");
    conn.execute(&sql, params![user_id, value])?;
    Ok(())
}

pub fn append_analysis(conn: &Connection, record: &AnalysisRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO analyses (id, user_id, file_name, file_type, analysis_language,
            llm_provider_used, llm_model_used, extracted_text_length, analysis_sections, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id,
            record.user_id,
            record.file_name,
            record.file_type,
            record.analysis_language.as_str(),
            record.llm_provider_used,
            record.llm_model_used,
            record.extracted_text_length as i64,
            record.analysis_sections.to_string(),
            record.created_at,
        ],
    )?;
    Ok(())
}

pub fn list_analyses(conn: &Connection, user_id: &str, paging: Paging) -> Result<Vec<AnalysisRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, file_name, file_type, analysis_language, llm_provider_used,
            llm_model_used, extracted_text_length, analysis_sections, created_at
         FROM analyses WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
    )?;
    let limit = if paging.limit == 0 { 50 } else { paging.limit };
    let rows = stmt.query_map(params![user_id, limit, paging.offset], |row| {
        let analysis_language =
            Language::from_str(&row.get::<_, String>(4)?).unwrap_or(Language::En);
        let sections_text: String = row.get(8)?;
        let analysis_sections =
            serde_json::from_str(&sections_text).unwrap_or(serde_json::Value::Null);
        Ok(AnalysisRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            file_name: row.get(2)?,
            file_type: row.get(3)?,
            analysis_language,
            llm_provider_used: row.get(5)?,
            llm_model_used: row.get(6)?,
            extracted_text_length: row.get::<_, i64>(7)? as usize,
            analysis_sections,
            created_at: row.get(9)?,
        })
    })?;
    rows.collect()
}

pub fn append_letter(conn: &Connection, record: &LetterRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO letters (id, user_id, recipient_category, template_key, subject,
            body_de, body_translation, variables_snapshot, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id,
            record.user_id,
            record.recipient_category,
            record.template_key,
            record.subject,
            record.body_de,
            record.body_translation,
            record.variables_snapshot.to_string(),
            record.created_at,
        ],
    )?;
    Ok(())
}

pub fn list_letters(conn: &Connection, user_id: &str, paging: Paging) -> Result<Vec<LetterRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, recipient_category, template_key, subject, body_de,
            body_translation, variables_snapshot, created_at
         FROM letters WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
    )?;
    let limit = if paging.limit == 0 { 50 } else { paging.limit };
    let rows = stmt.query_map(params![user_id, limit, paging.offset], |row| {
        let variables_text: String = row.get(7)?;
        Ok(LetterRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            recipient_category: row.get(2)?,
            template_key: row.get(3)?,
            subject: row.get(4)?,
            body_de: row.get(5)?,
            body_translation: row.get(6)?,
            variables_snapshot: serde_json::from_str(&variables_text)
                .unwrap_or(serde_json::Value::Null),
            created_at: row.get(8)?,
        })
    })?;
    rows.collect()
}

pub fn get_app_text(conn: &Connection, key: &str) -> Result<Option<AppText>> {
    conn.query_row(
        "SELECT key, category, value, description, updated_at FROM app_text WHERE key = ?1",
        params![key],
        |row| {
            Ok(AppText {
                key: row.get(0)?,
                category: row.get(1)?,
                value: row.get(2)?,
                description: row.get(3)?,
                updated_at: row.get(4)?,
            })
        },
    )
    .optional()
}

pub fn put_app_text(
    conn: &Connection,
    key: &str,
    value: &str,
    category: &str,
    description: Option<&str>,
    updated_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO app_text (key, category, value, description, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, category = excluded.category,
            description = excluded.description, updated_at = excluded.updated_at",
        params![key, category, value, description, updated_at],
    )?;
    Ok(())
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

pub fn count_analyses(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM analyses", [], |row| row.get(0))
}

fn provider_label(provider: OAuthProvider) -> &'static str {
    match provider {
        OAuthProvider::GoogleLike => "google_like",
        OAuthProvider::ChatLike => "chat_like",
    }
}
