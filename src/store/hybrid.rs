use crate::models::collection::Collection;
use crate::models::document::Document;

use super::local::LocalStore;
use super::{AdminSeed, Store, StoreError, StoreResult};

/// Remote-first store. Every call goes to the remote; when it reports
/// `Unavailable` the same call runs once against the local files.
/// Any other remote error reaches the caller untouched.
pub struct HybridStore {
    remote: Box<dyn Store>,
    local: LocalStore,
}

impl HybridStore {
    pub fn new(remote: Box<dyn Store>, local: LocalStore) -> Self {
        Self { remote, local }
    }

    #[cfg(test)]
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    fn with_fallback<T>(
        &self,
        op: &str,
        call: impl Fn(&dyn Store) -> StoreResult<T>,
    ) -> StoreResult<T> {
        match call(self.remote.as_ref()) {
            Err(StoreError::Unavailable) => {
                log::warn!("Remote API not available, {} served from local storage", op);
                call(&self.local)
            }
            other => other,
        }
    }
}

impl Store for HybridStore {
    fn run_migrations(&self) -> StoreResult<()> {
        self.local.run_migrations()?;
        self.remote.run_migrations()
    }

    fn backend_name(&self) -> &'static str {
        "hybrid"
    }

    fn ping(&self) -> StoreResult<()> {
        self.with_fallback("ping", |s| s.ping())
    }

    fn seed_defaults(&self, admin_seed: &AdminSeed) -> StoreResult<bool> {
        self.with_fallback("seed", |s| s.seed_defaults(admin_seed))
    }

    fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        self.with_fallback("list", |s| s.list(collection))
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        self.with_fallback("get", |s| s.get(collection, id))
    }

    fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        self.with_fallback("insert", |s| s.insert(collection, doc.clone()))
    }

    fn update(&self, collection: Collection, id: &str, patch: Document) -> StoreResult<bool> {
        self.with_fallback("update", |s| s.update(collection, id, patch.clone()))
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        self.with_fallback("delete", |s| s.delete(collection, id))
    }

    fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<Document>> {
        self.with_fallback("find", |s| s.find_by(collection, field, value))
    }

    fn count(&self, collection: Collection) -> StoreResult<u64> {
        self.with_fallback("count", |s| s.count(collection))
    }

    fn count_unread(&self, collection: Collection) -> StoreResult<u64> {
        self.with_fallback("count", |s| s.count_unread(collection))
    }

    fn verify_admin(&self, username: &str, password: &str) -> StoreResult<bool> {
        self.with_fallback("login", |s| s.verify_admin(username, password))
    }

    fn settings_get(&self) -> StoreResult<Option<Document>> {
        match self.remote.settings_get() {
            Err(StoreError::Unavailable) => {
                log::warn!("Remote API not available, settings served from local storage");
                Ok(Some(self.local.settings_or_fallback()))
            }
            other => other,
        }
    }

    fn settings_update(&self, patch: Document) -> StoreResult<()> {
        self.with_fallback("settings update", |s| s.settings_update(patch.clone()))
    }
}
