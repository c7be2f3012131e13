use serde::Deserialize;
use serde_json::{json, Value};

use super::collection::Collection;
use super::document::{from_value, Document};
use crate::store::{Store, StoreError};

pub const ADMIN_ID: &str = "admin-user";

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
// Keeps the seed fast in unit tests.
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default, alias = "email")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Build the admin credential document with a bcrypt-hashed password.
pub fn credential_document(username: &str, password: &str) -> Result<Document, String> {
    let hash = bcrypt::hash(password, HASH_COST).map_err(|e| e.to_string())?;
    from_value(json!({
        "id": ADMIN_ID,
        "username": username,
        "passwordHash": hash,
    }))
    .ok_or_else(|| "credential document is not an object".to_string())
}

/// Check a username/password pair against the stored admin credential.
pub fn verify<S: Store + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<bool, StoreError> {
    if username.is_empty() || password.is_empty() {
        return Ok(false);
    }
    let Some(admin) = store.find_by(Collection::Admin, "username", username)? else {
        return Ok(false);
    };
    let hash = admin
        .get("passwordHash")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(bcrypt::verify(password, hash).unwrap_or(false))
}

/// Opaque access token handed out on login.
pub fn new_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_hash_verifies() {
        let doc = credential_document("admin", "s3cret").unwrap();
        let hash = doc["passwordHash"].as_str().unwrap();
        assert_ne!(hash, "s3cret");
        assert!(bcrypt::verify("s3cret", hash).unwrap());
        assert_eq!(doc["id"], json!(ADMIN_ID));
    }

    #[test]
    fn tokens_are_hex_and_unique() {
        let t = new_token();
        assert_eq!(t.len(), 64);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(t, new_token());
    }
}
