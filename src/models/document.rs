use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use super::collection::Collection;

/// A loosely-typed content document. Every stored document carries a string `id`.
pub type Document = Map<String, Value>;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Generate a `<unix-millis>-<9 base36 chars>` identifier.
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Current time as an RFC 3339 UTC string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn id_of(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Stamp a document about to be inserted: keep a caller-supplied id or
/// generate one, set `createdAt`, and apply per-collection defaults.
pub fn prepare_insert(collection: Collection, mut doc: Document) -> Document {
    let id = id_of(&doc).map(str::to_string).unwrap_or_else(new_id);
    doc.insert("id".into(), Value::String(id));
    doc.insert("createdAt".into(), Value::String(now_iso()));
    if collection == Collection::Messages {
        doc.entry("read").or_insert(Value::Bool(false));
    }
    doc
}

/// Strip the id from an update patch and stamp `updatedAt`.
pub fn prepare_update(mut patch: Document) -> Document {
    patch.remove("id");
    patch.remove("_id");
    patch.insert("updatedAt".into(), Value::String(now_iso()));
    patch
}

/// Shallow merge, later keys win.
pub fn merge(target: &mut Document, patch: Document) {
    for (k, v) in patch {
        target.insert(k, v);
    }
}

/// Interpret a JSON value as a document; anything but an object is rejected.
pub fn from_value(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// A message counts as unread unless `read` is literally `true`.
pub fn is_unread(doc: &Document) -> bool {
    doc.get("read").and_then(Value::as_bool) != Some(true)
}
