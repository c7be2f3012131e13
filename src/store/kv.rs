use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::db::{self, DbPool};
use crate::models::collection::Collection;
use crate::models::document::{self, Document};

use super::{Store, StoreError, StoreResult};

/// Key under which the single settings document lives.
const SETTINGS_KEY: &str = "settings";

/// Key-value implementation of the Store trait, laid out the way the edge
/// functions keep content: one JSON value per `<prefix>:<id>` key, listed
/// by prefix scan. Backed by a single SQLite table.
pub struct KvStore {
    pool: DbPool,
}

impl KvStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        Ok(Self::new(db::init_pool_at(path)?))
    }

    pub fn in_memory() -> Result<Self, String> {
        Ok(Self::new(db::init_memory_pool()?))
    }

    fn key(collection: Collection, id: &str) -> String {
        format!("{}{}", collection.kv_prefix(), id)
    }

    fn conn(&self) -> StoreResult<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        self.pool.get().map_err(StoreError::backend)
    }

    // ── Raw key-value operations ─────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> StoreResult<Option<Document>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::backend)?;
        raw.map(|s| decode(&s)).transpose()
    }

    pub fn kv_set(&self, key: &str, value: &Document) -> StoreResult<()> {
        let conn = self.conn()?;
        let raw = serde_json::to_string(value)?;
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, raw],
        )
        .map_err(StoreError::backend)?;
        Ok(())
    }

    pub fn kv_del(&self, key: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let n = conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(StoreError::backend)?;
        Ok(n > 0)
    }

    /// All values whose key starts with `prefix`, in key order.
    pub fn kv_get_by_prefix(&self, prefix: &str) -> StoreResult<Vec<Document>> {
        let conn = self.conn()?;
        // substr avoids LIKE wildcards in ids
        let mut stmt = conn
            .prepare(
                "SELECT value FROM kv_store
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY key",
            )
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))
            .map_err(StoreError::backend)?;
        let mut out = Vec::new();
        for raw in rows {
            let raw = raw.map_err(StoreError::backend)?;
            out.push(decode(&raw)?);
        }
        Ok(out)
    }
}

fn decode(raw: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected object, found {}",
            other
        ))),
    }
}

impl Store for KvStore {
    fn run_migrations(&self) -> StoreResult<()> {
        db::run_migrations(&self.pool).map_err(StoreError::Backend)
    }

    fn backend_name(&self) -> &'static str {
        "kv"
    }

    fn ping(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(StoreError::backend)
    }

    fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        self.kv_get_by_prefix(&collection.kv_prefix())
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        self.kv_get(&Self::key(collection, id))
    }

    fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        let doc = document::prepare_insert(collection, doc);
        let id = document::id_of(&doc).unwrap_or_default().to_string();
        let key = Self::key(collection, &id);
        if self.kv_get(&key)?.is_some() {
            return Err(StoreError::Duplicate(id));
        }
        self.kv_set(&key, &doc)?;
        Ok(doc)
    }

    fn update(&self, collection: Collection, id: &str, patch: Document) -> StoreResult<bool> {
        let key = Self::key(collection, id);
        let Some(mut existing) = self.kv_get(&key)? else {
            return Ok(false);
        };
        document::merge(&mut existing, document::prepare_update(patch));
        existing.insert("id".into(), Value::String(id.to_string()));
        self.kv_set(&key, &existing)?;
        Ok(true)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        self.kv_del(&Self::key(collection, id))
    }

    fn settings_get(&self) -> StoreResult<Option<Document>> {
        self.kv_get(SETTINGS_KEY)
    }

    fn settings_update(&self, patch: Document) -> StoreResult<()> {
        let mut settings = self.kv_get(SETTINGS_KEY)?.unwrap_or_default();
        document::merge(&mut settings, document::prepare_update(patch));
        self.kv_set(SETTINGS_KEY, &settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{doc, kv_store};
    use serde_json::json;

    #[test]
    fn documents_live_under_prefixed_keys() {
        let s = kv_store();
        s.insert(Collection::Qas, doc(json!({"id": "qa-1", "question": "?"})))
            .unwrap();
        assert!(s.kv_get("qa:qa-1").unwrap().is_some());
        assert!(s.kv_get("qas:qa-1").unwrap().is_none());
    }

    #[test]
    fn prefix_scan_does_not_leak_between_collections() {
        let s = kv_store();
        s.insert(Collection::Posts, doc(json!({"id": "1"}))).unwrap();
        // "post:" must not pick up a key that merely starts with "post"
        s.kv_set("postscript:1", &doc(json!({"id": "x"}))).unwrap();
        assert_eq!(s.list(Collection::Posts).unwrap().len(), 1);
    }

    #[test]
    fn ids_with_like_wildcards_are_literal() {
        let s = kv_store();
        s.insert(Collection::Jobs, doc(json!({"id": "a%b"}))).unwrap();
        s.insert(Collection::Jobs, doc(json!({"id": "a_c"}))).unwrap();
        assert_eq!(s.kv_get_by_prefix("job:a%").unwrap().len(), 1);
    }

    #[test]
    fn non_object_values_are_rejected() {
        let s = kv_store();
        let conn = s.pool.get().unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES ('video:bad', '[1,2]')",
            [],
        )
        .unwrap();
        drop(conn);
        assert!(matches!(
            s.get(Collection::Videos, "bad"),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
