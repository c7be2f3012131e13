use std::time::Duration;

use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, UpdateOptions};
use mongodb::sync::{Client, Collection as MongoCollection, Database};
use mongodb::IndexModel;
use serde_json::Value;

use crate::models::collection::Collection;
use crate::models::document::{self, Document};
use crate::models::settings::SETTINGS_ID;

use super::{Store, StoreError, StoreResult};

/// MongoDB-backed implementation of the Store trait. Documents keep their
/// string id in `_id`; it is surfaced as `id` on the way out.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Create a new MongoStore by connecting to the given URI and database name.
    pub fn new(uri: &str, db_name: &str) -> Result<Self, String> {
        let mut client_options = ClientOptions::parse(uri).map_err(|e| e.to_string())?;
        client_options.app_name = Some("folio".to_string());
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        let client = Client::with_options(client_options).map_err(|e| e.to_string())?;
        let db = client.database(db_name);
        Ok(Self { db })
    }

    /// Test connectivity by pinging the server.
    pub fn test_connection(&self) -> Result<(), String> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| format!("MongoDB connection test failed: {}", e))?;
        Ok(())
    }

    fn coll(&self, collection: Collection) -> MongoCollection<BsonDocument> {
        self.db.collection::<BsonDocument>(collection.name())
    }

    fn find_one(
        &self,
        collection: Collection,
        filter: BsonDocument,
    ) -> StoreResult<Option<Document>> {
        self.coll(collection)
            .find_one(filter, None)
            .map_err(StoreError::backend)?
            .map(from_bson)
            .transpose()
    }
}

const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY_CODE
    )
}

// ── Helpers: JSON <-> BSON ──

fn to_bson(doc: Document) -> StoreResult<BsonDocument> {
    bson::to_document(&doc).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

fn from_bson(mut d: BsonDocument) -> StoreResult<Document> {
    let id = d.remove("_id");
    let mut out = match Bson::Document(d).into_relaxed_extjson() {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::InvalidDocument(format!(
                "expected object, found {}",
                other
            )))
        }
    };
    match id {
        Some(Bson::String(s)) => {
            out.insert("id".into(), Value::String(s));
        }
        Some(Bson::ObjectId(oid)) => {
            out.insert("id".into(), Value::String(oid.to_hex()));
        }
        Some(other) => {
            out.insert("id".into(), other.into_relaxed_extjson());
        }
        None => {}
    }
    Ok(out)
}

impl Store for MongoStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> StoreResult<()> {
        self.coll(Collection::Newsletter)
            .create_index(
                IndexModel::builder().keys(doc! { "email": 1 }).build(),
                None,
            )
            .map_err(StoreError::backend)?;
        self.coll(Collection::Messages)
            .create_index(IndexModel::builder().keys(doc! { "read": 1 }).build(), None)
            .map_err(StoreError::backend)?;
        self.coll(Collection::Admin)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn ping(&self) -> StoreResult<()> {
        self.test_connection().map_err(StoreError::Backend)
    }

    // ── Documents ───────────────────────────────────────────────────

    fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let cursor = self
            .coll(collection)
            .find(doc! {}, None)
            .map_err(StoreError::backend)?;
        let mut out = Vec::new();
        for d in cursor {
            out.push(from_bson(d.map_err(StoreError::backend)?)?);
        }
        Ok(out)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        self.find_one(collection, doc! { "_id": id })
    }

    fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        let stored = document::prepare_insert(collection, doc);
        let mut body = stored.clone();
        let id = body.remove("id").unwrap_or(Value::Null);
        let mut bson_doc = to_bson(body)?;
        if let Value::String(id) = id {
            bson_doc.insert("_id", id);
        }
        match self.coll(collection).insert_one(bson_doc, None) {
            Ok(_) => Ok(stored),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate(
                document::id_of(&stored).unwrap_or_default().to_string(),
            )),
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    fn update(&self, collection: Collection, id: &str, patch: Document) -> StoreResult<bool> {
        let set = to_bson(document::prepare_update(patch))?;
        let result = self
            .coll(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .map_err(StoreError::backend)?;
        Ok(result.matched_count > 0)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let result = self
            .coll(collection)
            .delete_one(doc! { "_id": id }, None)
            .map_err(StoreError::backend)?;
        Ok(result.deleted_count > 0)
    }

    fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<Document>> {
        let mut filter = BsonDocument::new();
        filter.insert(field, value);
        self.find_one(collection, filter)
    }

    fn count(&self, collection: Collection) -> StoreResult<u64> {
        self.coll(collection)
            .count_documents(doc! {}, None)
            .map_err(StoreError::backend)
    }

    fn count_unread(&self, collection: Collection) -> StoreResult<u64> {
        self.coll(collection)
            .count_documents(doc! { "read": { "$ne": true } }, None)
            .map_err(StoreError::backend)
    }

    // ── Settings ────────────────────────────────────────────────────

    fn settings_get(&self) -> StoreResult<Option<Document>> {
        Ok(self
            .find_one(Collection::Settings, doc! { "_id": SETTINGS_ID })?
            .map(|mut s| {
                s.remove("id");
                s
            }))
    }

    fn settings_update(&self, patch: Document) -> StoreResult<()> {
        let set = to_bson(document::prepare_update(patch))?;
        let opts = UpdateOptions::builder().upsert(true).build();
        self.coll(Collection::Settings)
            .update_one(doc! { "_id": SETTINGS_ID }, doc! { "$set": set }, opts)
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
