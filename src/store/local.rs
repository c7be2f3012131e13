use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;

use crate::models::collection::Collection;
use crate::models::document::{self, Document};
use crate::models::settings;

use super::{Store, StoreError, StoreResult};

/// Local fallback storage: one JSON array file per collection under `dir`,
/// rewritten whole on every change. Reads never fail; a missing or corrupt
/// file reads as an empty collection.
pub struct LocalStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the files are still usable.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_value(&self, name: &str) -> Option<Value> {
        let path = self.path(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Ignoring corrupt {}: {}", path.display(), e);
                None
            }
        }
    }

    fn read_items(&self, collection: Collection) -> Vec<Document> {
        match self.read_value(collection.name()) {
            Some(Value::Array(items)) => items.into_iter().filter_map(document::from_value).collect(),
            Some(_) => {
                log::warn!("{} is not an array, treating as empty", collection);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn write_value(&self, name: &str, value: &Value) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Local(e.to_string()))?;
        let path = self.path(name);
        let raw = serde_json::to_string_pretty(value)?;
        // write-then-rename: readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| StoreError::Local(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Local(e.to_string()))
    }

    fn write_items(&self, collection: Collection, items: Vec<Document>) -> StoreResult<()> {
        let value = Value::Array(items.into_iter().map(Value::Object).collect());
        self.write_value(collection.name(), &value)
    }
}

impl Store for LocalStore {
    fn run_migrations(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Local(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let _g = self.guard();
        Ok(self.read_items(collection))
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let _g = self.guard();
        Ok(self
            .read_items(collection)
            .into_iter()
            .find(|d| document::id_of(d) == Some(id)))
    }

    fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        let _g = self.guard();
        let doc = document::prepare_insert(collection, doc);
        let mut items = self.read_items(collection);
        let id = document::id_of(&doc);
        if items.iter().any(|d| document::id_of(d) == id) {
            return Err(StoreError::Duplicate(id.unwrap_or_default().to_string()));
        }
        items.push(doc.clone());
        self.write_items(collection, items)?;
        Ok(doc)
    }

    fn update(&self, collection: Collection, id: &str, patch: Document) -> StoreResult<bool> {
        let _g = self.guard();
        let mut items = self.read_items(collection);
        let Some(item) = items.iter_mut().find(|d| document::id_of(d) == Some(id)) else {
            return Ok(false);
        };
        document::merge(item, document::prepare_update(patch));
        self.write_items(collection, items)?;
        Ok(true)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let _g = self.guard();
        let items = self.read_items(collection);
        let before = items.len();
        let kept: Vec<Document> = items
            .into_iter()
            .filter(|d| document::id_of(d) != Some(id))
            .collect();
        let removed = kept.len() != before;
        self.write_items(collection, kept)?;
        Ok(removed)
    }

    fn settings_get(&self) -> StoreResult<Option<Document>> {
        let _g = self.guard();
        Ok(self
            .read_value(Collection::Settings.name())
            .and_then(document::from_value))
    }

    fn settings_update(&self, patch: Document) -> StoreResult<()> {
        let _g = self.guard();
        let mut current = self
            .read_value(Collection::Settings.name())
            .and_then(document::from_value)
            .unwrap_or_default();
        document::merge(&mut current, document::prepare_update(patch));
        self.write_value(Collection::Settings.name(), &Value::Object(current))
    }
}

impl LocalStore {
    /// Settings for display: the saved document, or the built-in fallback.
    pub fn settings_or_fallback(&self) -> Document {
        match self.settings_get() {
            Ok(Some(s)) => s,
            _ => settings::fallback_settings(),
        }
    }
}
