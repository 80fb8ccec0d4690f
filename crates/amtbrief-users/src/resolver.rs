use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rusqlite::Connection;
use tracing::info;

use crate::error::Result;
use crate::types::{AnalysisRecord, AppText, LetterRecord, Paging, User};
use amtbrief_core::types::new_record_id;
use amtbrief_identity::NormalizedIdentity;

/// The User & Key Store — the sole shared mutable resource in the
/// process. Writes are serialized per `user_id` via a keyed lock; reads
/// are lock-free snapshots against the shared connection.
pub struct UserStore {
    db: Arc<Mutex<Connection>>,
    write_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl UserStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self {
            db,
            write_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.write_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// `upsert_user(normalized_user) → User`.
    pub async fn upsert_user(&self, identity: &NormalizedIdentity) -> Result<User> {
        let lock = self.lock_for(&identity.id);
        let _guard = lock.lock().await;
        let conn = self.db.lock().unwrap();
        crate::identity::upsert_user(&conn, identity)
    }

    /// `get_user(id) → User | NotFound`.
    pub fn get_user(&self, user_id: &str) -> Result<User> {
        let conn = self.db.lock().unwrap();
        crate::identity::get_user(&conn, user_id)
    }

    /// `set_key_slot(user_id, slot, value|null)`. Internal storage is
    /// always by slot number; callers resolve name aliasing before this call
    /// (see `merge_key_fields`).
    pub async fn set_key_slot(&self, user_id: &str, slot: u8, value: Option<&str>) -> Result<()> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;
        let conn = self.db.lock().unwrap();
        crate::db::set_key_slot(&conn, user_id, slot, value)?;
        Ok(())
    }

    pub fn list_analyses(&self, user_id: &str, paging: Paging) -> Result<Vec<AnalysisRecord>> {
        let conn = self.db.lock().unwrap();
        Ok(crate::db::list_analyses(&conn, user_id, paging)?)
    }

    /// `append_analysis(record)` — monotonic append, `id` assigned by store.
    pub async fn append_analysis(&self, mut record: AnalysisRecord) -> Result<AnalysisRecord> {
        record.id = new_record_id();
        let lock = self.lock_for(&record.user_id);
        let _guard = lock.lock().await;
        let conn = self.db.lock().unwrap();
        crate::db::append_analysis(&conn, &record)?;
        Ok(record)
    }

    /// `append_letter(record)` — monotonic append, `id` assigned by store.
    pub async fn append_letter(&self, mut record: LetterRecord) -> Result<LetterRecord> {
        record.id = new_record_id();
        let lock = self.lock_for(&record.user_id);
        let _guard = lock.lock().await;
        let conn = self.db.lock().unwrap();
        crate::db::append_letter(&conn, &record)?;
        Ok(record)
    }

    pub fn list_letters(&self, user_id: &str, paging: Paging) -> Result<Vec<LetterRecord>> {
        let conn = self.db.lock().unwrap();
        Ok(crate::db::list_letters(&conn, user_id, paging)?)
    }

    pub fn get_app_text(&self, key: &str) -> Result<Option<AppText>> {
        let conn = self.db.lock().unwrap();
        Ok(crate::db::get_app_text(&conn, key)?)
    }

    pub async fn put_app_text(
        &self,
        key: &str,
        value: &str,
        category: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let now = amtbrief_core::types::now_rfc3339();
        let conn = self.db.lock().unwrap();
        crate::db::put_app_text(&conn, key, value, category, description, &now)?;
        Ok(())
    }

    pub fn counts(&self) -> Result<(i64, i64)> {
        let conn = self.db.lock().unwrap();
        Ok((crate::db::count_users(&conn)?, crate::db::count_analyses(&conn)?))
    }
}

/// New vs. legacy API key field names, reconciled by an explicit merge
/// function with a documented precedence.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyFields {
    pub api_key_1: Option<String>,
    pub api_key_2: Option<String>,
    pub api_key_3: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

/// Merges new slot-numbered fields with legacy provider-named fields.
/// New names win on conflict.
pub fn merge_key_fields(fields: &ApiKeyFields) -> [Option<String>; 3] {
    [
        fields.api_key_1.clone().or_else(|| fields.gemini_api_key.clone()),
        fields.api_key_2.clone().or_else(|| fields.openai_api_key.clone()),
        fields.api_key_3.clone().or_else(|| fields.anthropic_api_key.clone()),
    ]
}

pub fn log_store_ready(db_path: &str) {
    info!(db_path, "user store ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_name_wins_over_legacy_name() {
        let fields = ApiKeyFields {
            api_key_1: Some("K1".into()),
            gemini_api_key: Some("K1_OLD".into()),
            ..Default::default()
        };
        let merged = merge_key_fields(&fields);
        assert_eq!(merged[0].as_deref(), Some("K1"));
    }

    #[test]
    fn legacy_name_used_when_new_name_absent() {
        let fields = ApiKeyFields {
            openai_api_key: Some("legacy".into()),
            ..Default::default()
        };
        let merged = merge_key_fields(&fields);
        assert_eq!(merged[1].as_deref(), Some("legacy"));
    }

    #[tokio::test]
    async fn set_key_slot_then_get_user_exposes_preview_not_raw() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        let store = UserStore::new(Arc::new(Mutex::new(conn)));

        let identity = NormalizedIdentity {
            id: "telegram_1".to_string(),
            email: "1@telegram.local".to_string(),
            display_name: "A".to_string(),
            picture_url: None,
            oauth_provider: amtbrief_core::types::OAuthProvider::ChatLike,
            preferred_language_hint: None,
        };
        store.upsert_user(&identity).await.unwrap();
        store.set_key_slot("telegram_1", 1, Some("sk-ant-abcdefgh")).await.unwrap();

        let user = store.get_user("telegram_1").unwrap();
        assert_eq!(user.api_key_slot_1.as_deref(), Some("sk-ant-abcdefgh"));
        let preview = amtbrief_core::redact::preview(user.api_key_slot_1.as_deref().unwrap());
        assert!(!preview.contains("abcdefgh"));
    }
}
