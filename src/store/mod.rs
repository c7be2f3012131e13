use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::{Backend, Config};

use crate::models::admin;
use crate::models::collection::Collection;
use crate::models::document::{self, Document};

pub mod hybrid;
pub mod kv;
pub mod local;
pub mod mongo;
pub mod remote;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote backend could not be reached at probe time. Only this
    /// variant triggers the local fallback.
    #[error("API_NOT_AVAILABLE")]
    Unavailable,
    #[error("backend error: {0}")]
    Backend(String),
    #[error("local storage error: {0}")]
    Local(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// Insert with an id the collection already holds.
    #[error("document {0} already exists")]
    Duplicate(String),
}

impl StoreError {
    pub fn backend(e: impl std::fmt::Display) -> Self {
        StoreError::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Open the configured backend and prepare it for use.
pub fn open(config: &Config) -> Result<Arc<dyn Store>, String> {
    let db = &config.database;
    let store: Arc<dyn Store> = match db.backend {
        Backend::Mongodb => {
            let store = mongo::MongoStore::new(&db.uri, &db.name)?;
            store.test_connection()?;
            Arc::new(store)
        }
        Backend::Kv => Arc::new(kv::KvStore::new_at(&db.kv_path.to_string_lossy())?),
        Backend::Local => Arc::new(local::LocalStore::new(&db.local_dir)),
        Backend::Hybrid => {
            let remote = remote::RemoteStore::new(
                &db.remote_url,
                db.probe_timeout(),
                config.seed_token().map(str::to_string),
            );
            Arc::new(hybrid::HybridStore::new(
                Box::new(remote),
                local::LocalStore::new(&db.local_dir),
            ))
        }
    };
    store.run_migrations().map_err(|e| e.to_string())?;
    log::info!("Using {} store", store.backend_name());
    Ok(store)
}

/// Admin credential the seed writes when the database is empty.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

/// Unified data-access trait. Every content read and write goes through here.
/// Implementations: `MongoStore`, `KvStore`, `LocalStore`, `RemoteStore`
/// and the `HybridStore` that composes the last two.
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> StoreResult<()>;

    /// Return the backend name: "mongodb", "kv", "local", "remote" or "hybrid".
    fn backend_name(&self) -> &'static str;

    fn ping(&self) -> StoreResult<()>;

    /// Insert sample content, default settings and the admin credential
    /// unless a settings document already exists. Returns whether it seeded.
    fn seed_defaults(&self, admin_seed: &AdminSeed) -> StoreResult<bool> {
        if self.settings_get()?.is_some() {
            return Ok(false);
        }
        for (collection, docs) in crate::seed::sample_content() {
            for doc in docs {
                match self.insert(collection, doc) {
                    Ok(_) | Err(StoreError::Duplicate(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        let credential = admin::credential_document(&admin_seed.username, &admin_seed.password)
            .map_err(StoreError::InvalidDocument)?;
        if self.get(Collection::Admin, admin::ADMIN_ID)?.is_none() {
            self.insert(Collection::Admin, credential)?;
        }
        self.settings_update(crate::models::settings::seeded_settings())?;
        log::info!("Seeded {} store with sample content", self.backend_name());
        Ok(true)
    }

    // ── Documents ───────────────────────────────────────────────────
    fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;
    /// Persist a new document. Assigns `id` when absent, stamps `createdAt`.
    /// A caller-supplied id that is already taken fails with `Duplicate`.
    fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document>;
    /// Merge `patch` into the document with `id`, stamping `updatedAt`.
    /// Returns false when no document matched.
    fn update(&self, collection: Collection, id: &str, patch: Document) -> StoreResult<bool>;
    fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool>;

    fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<Document>> {
        Ok(self
            .list(collection)?
            .into_iter()
            .find(|d| d.get(field).and_then(Value::as_str) == Some(value)))
    }

    fn count(&self, collection: Collection) -> StoreResult<u64> {
        Ok(self.list(collection)?.len() as u64)
    }

    fn count_unread(&self, collection: Collection) -> StoreResult<u64> {
        Ok(self
            .list(collection)?
            .iter()
            .filter(|d| document::is_unread(d))
            .count() as u64)
    }

    /// Check a login against the stored admin credential.
    fn verify_admin(&self, username: &str, password: &str) -> StoreResult<bool> {
        admin::verify(self, username, password)
    }

    // ── Settings ────────────────────────────────────────────────────
    fn settings_get(&self) -> StoreResult<Option<Document>>;
    /// Merge fields into the settings document, creating it if needed.
    fn settings_update(&self, patch: Document) -> StoreResult<()>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::kv::KvStore;
    use crate::store::local::LocalStore;
    use serde_json::json;

    static TEST_DIR_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

    /// Fresh in-memory KV store with migrations applied.
    pub(crate) fn kv_store() -> KvStore {
        let store = KvStore::in_memory().expect("in-memory kv store");
        store.run_migrations().expect("migrations failed");
        store
    }

    /// Fresh local store in a unique temp directory.
    pub(crate) fn local_store() -> LocalStore {
        let n = TEST_DIR_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "folio_test_{}_{}",
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let store = LocalStore::new(dir);
        store.run_migrations().expect("local migrations failed");
        store
    }

    pub(crate) fn doc(value: serde_json::Value) -> Document {
        document::from_value(value).expect("object")
    }

    fn admin_seed() -> AdminSeed {
        AdminSeed {
            username: "admin".into(),
            password: "admin123".into(),
        }
    }

    fn each_store(check: impl Fn(&dyn Store)) {
        check(&kv_store());
        check(&local_store());
    }

    // ── Documents ───────────────────────────────────────────────────

    #[test]
    fn empty_collection_lists_nothing() {
        each_store(|s| {
            assert!(s.list(Collection::Projects).unwrap().is_empty());
            assert_eq!(s.count(Collection::Projects).unwrap(), 0);
            assert!(s.get(Collection::Projects, "missing").unwrap().is_none());
        });
    }

    #[test]
    fn insert_then_get() {
        each_store(|s| {
            let stored = s
                .insert(Collection::Projects, doc(json!({"title": "Site"})))
                .unwrap();
            let id = document::id_of(&stored).unwrap().to_string();
            assert!(stored.contains_key("createdAt"));

            let found = s.get(Collection::Projects, &id).unwrap().expect("stored");
            assert_eq!(found["title"], json!("Site"));
            assert_eq!(found["id"], json!(id));
            assert_eq!(s.list(Collection::Projects).unwrap().len(), 1);
            // Other collections untouched
            assert!(s.list(Collection::Posts).unwrap().is_empty());
        });
    }

    #[test]
    fn insert_with_taken_id_is_rejected() {
        each_store(|s| {
            s.insert(Collection::Projects, doc(json!({"id": "p1", "title": "First"})))
                .unwrap();
            let again = s.insert(Collection::Projects, doc(json!({"id": "p1", "title": "Second"})));
            assert!(matches!(again, Err(StoreError::Duplicate(id)) if id == "p1"));

            let kept = s.get(Collection::Projects, "p1").unwrap().unwrap();
            assert_eq!(kept["title"], json!("First"));
            assert_eq!(s.count(Collection::Projects).unwrap(), 1);
            // same id in another collection is fine
            s.insert(Collection::Posts, doc(json!({"id": "p1"}))).unwrap();
        });
    }

    #[test]
    fn update_merges_and_stamps() {
        each_store(|s| {
            s.insert(
                Collection::Jobs,
                doc(json!({"id": "job-1", "title": "Dev", "company": "Acme"})),
            )
            .unwrap();
            let matched = s
                .update(Collection::Jobs, "job-1", doc(json!({"title": "Lead Dev"})))
                .unwrap();
            assert!(matched);
            let job = s.get(Collection::Jobs, "job-1").unwrap().unwrap();
            assert_eq!(job["title"], json!("Lead Dev"));
            assert_eq!(job["company"], json!("Acme"));
            assert_eq!(job["id"], json!("job-1"));
            assert!(job.contains_key("updatedAt"));
        });
    }

    #[test]
    fn update_missing_is_not_an_error() {
        each_store(|s| {
            let matched = s
                .update(Collection::Jobs, "nope", doc(json!({"title": "x"})))
                .unwrap();
            assert!(!matched);
            assert!(s.list(Collection::Jobs).unwrap().is_empty());
        });
    }

    #[test]
    fn delete_removes_only_target() {
        each_store(|s| {
            s.insert(Collection::Videos, doc(json!({"id": "v1"}))).unwrap();
            s.insert(Collection::Videos, doc(json!({"id": "v2"}))).unwrap();
            assert!(s.delete(Collection::Videos, "v1").unwrap());
            assert!(!s.delete(Collection::Videos, "v1").unwrap());
            let left = s.list(Collection::Videos).unwrap();
            assert_eq!(left.len(), 1);
            assert_eq!(left[0]["id"], json!("v2"));
        });
    }

    #[test]
    fn find_by_matches_string_field() {
        each_store(|s| {
            s.insert(Collection::Newsletter, doc(json!({"email": "a@b.co"})))
                .unwrap();
            assert!(s
                .find_by(Collection::Newsletter, "email", "a@b.co")
                .unwrap()
                .is_some());
            assert!(s
                .find_by(Collection::Newsletter, "email", "x@b.co")
                .unwrap()
                .is_none());
        });
    }

    #[test]
    fn unread_counts_messages_without_read_true() {
        each_store(|s| {
            s.insert(Collection::Messages, doc(json!({"name": "a"}))).unwrap();
            s.insert(Collection::Messages, doc(json!({"name": "b", "read": true})))
                .unwrap();
            assert_eq!(s.count(Collection::Messages).unwrap(), 2);
            assert_eq!(s.count_unread(Collection::Messages).unwrap(), 1);
        });
    }

    // ── Settings ────────────────────────────────────────────────────

    #[test]
    fn settings_merge_and_stamp() {
        each_store(|s| {
            s.settings_update(doc(json!({"github": "gh", "email": "a@b.co"})))
                .unwrap();
            s.settings_update(doc(json!({"email": "c@d.co"}))).unwrap();
            let settings = s.settings_get().unwrap().expect("settings");
            assert_eq!(settings["github"], json!("gh"));
            assert_eq!(settings["email"], json!("c@d.co"));
            assert!(settings.contains_key("updatedAt"));
        });
    }

    // ── Seeding ─────────────────────────────────────────────────────

    #[test]
    fn seed_is_idempotent() {
        each_store(|s| {
            assert!(s.seed_defaults(&admin_seed()).unwrap());
            let projects = s.count(Collection::Projects).unwrap();
            assert!(projects > 0);
            assert!(s.count(Collection::Qas).unwrap() > 0);
            assert!(s.settings_get().unwrap().is_some());

            assert!(!s.seed_defaults(&admin_seed()).unwrap());
            assert_eq!(s.count(Collection::Projects).unwrap(), projects);
        });
    }

    #[test]
    fn seeded_admin_can_log_in() {
        each_store(|s| {
            s.seed_defaults(&admin_seed()).unwrap();
            assert!(s.verify_admin("admin", "admin123").unwrap());
            assert!(!s.verify_admin("admin", "wrong").unwrap());
            assert!(!s.verify_admin("root", "admin123").unwrap());
            assert!(!s.verify_admin("", "").unwrap());
        });
    }
}
