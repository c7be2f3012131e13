use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::models::collection::Collection;
use crate::models::document::{self, Document};

use super::{AdminSeed, Store, StoreError, StoreResult};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for another instance's `/api` handlers.
///
/// The first call probes `GET <base>/settings` once, bounded by the probe
/// timeout, and the outcome holds for the life of the process. While the
/// probe says the remote is down, every operation fails with
/// `StoreError::Unavailable`.
pub struct RemoteStore {
    base: String,
    probe_timeout: Duration,
    seed_token: Option<String>,
    // None once the probe has failed.
    client: OnceLock<Option<Client>>,
}

impl RemoteStore {
    pub fn new(base: &str, probe_timeout: Duration, seed_token: Option<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            probe_timeout,
            seed_token,
            client: OnceLock::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn client(&self) -> StoreResult<&Client> {
        self.client
            .get_or_init(|| self.probe())
            .as_ref()
            .ok_or(StoreError::Unavailable)
    }

    fn probe(&self) -> Option<Client> {
        let client = match Client::builder().timeout(REQUEST_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => {
                log::error!("Could not build HTTP client for {}: {}", self.base, e);
                return None;
            }
        };
        let url = self.url("settings");
        match client.get(&url).timeout(self.probe_timeout).send() {
            Ok(resp) if probe_accepts(resp.status()) => {
                log::info!("Remote API at {} is available ({})", self.base, resp.status());
                Some(client)
            }
            Ok(resp) => {
                log::warn!("Remote API probe got {} from {}", resp.status(), url);
                None
            }
            Err(e) => {
                log::warn!("Remote API at {} not reachable: {}", self.base, e);
                None
            }
        }
    }

    fn send(&self, req: RequestBuilder) -> StoreResult<Response> {
        req.send()
            .map_err(|e| StoreError::Backend(format!("remote request failed: {}", e)))
    }

    fn expect_success(resp: Response) -> StoreResult<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        Err(StoreError::Backend(format!("remote returned {}: {}", status, text)))
    }

    fn read_json(resp: Response) -> StoreResult<Value> {
        resp.json()
            .map_err(|e| StoreError::Backend(format!("remote JSON parse error: {}", e)))
    }
}

/// Statuses that prove the remote handler exists, even when it is unhappy.
fn probe_accepts(status: StatusCode) -> bool {
    status.is_success()
        || status == StatusCode::NOT_FOUND
        || status == StatusCode::INTERNAL_SERVER_ERROR
}

impl Store for RemoteStore {
    fn run_migrations(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }

    fn ping(&self) -> StoreResult<()> {
        self.client().map(|_| ())
    }

    /// Seeding runs on the remote side through `POST /init`.
    fn seed_defaults(&self, _admin_seed: &AdminSeed) -> StoreResult<bool> {
        let client = self.client()?;
        let mut req = client.post(self.url("init"));
        if let Some(token) = &self.seed_token {
            req = req.header("x-seed-token", token);
        }
        let body = Self::read_json(Self::expect_success(self.send(req)?)?)?;
        Ok(body.get("seeded").and_then(Value::as_bool).unwrap_or(true))
    }

    fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let client = self.client()?;
        let resp = self.send(client.get(self.url(collection.name())))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        match Self::read_json(Self::expect_success(resp)?)? {
            Value::Array(items) => Ok(items.into_iter().filter_map(document::from_value).collect()),
            other => Err(StoreError::InvalidDocument(format!(
                "expected array from remote {}, found {}",
                collection, other
            ))),
        }
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .list(collection)?
            .into_iter()
            .find(|d| document::id_of(d) == Some(id)))
    }

    fn insert(&self, collection: Collection, doc: Document) -> StoreResult<Document> {
        let client = self.client()?;
        let resp = self.send(client.post(self.url(collection.name())).json(&doc))?;
        if resp.status() == StatusCode::CONFLICT {
            let id = document::id_of(&doc).unwrap_or_default().to_string();
            return Err(StoreError::Duplicate(id));
        }
        match Self::read_json(Self::expect_success(resp)?)? {
            Value::Object(stored) => Ok(stored),
            _ => Ok(doc),
        }
    }

    fn update(&self, collection: Collection, id: &str, patch: Document) -> StoreResult<bool> {
        let client = self.client()?;
        let mut body = patch;
        body.insert("id".into(), Value::String(id.to_string()));
        let resp = self.send(client.put(self.url(collection.name())).json(&body))?;
        Self::expect_success(resp)?;
        Ok(true)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let client = self.client()?;
        let req = client.delete(self.url(collection.name())).query(&[("id", id)]);
        Self::expect_success(self.send(req)?)?;
        Ok(true)
    }

    /// The remote keeps its credential to itself; ask its login handler.
    fn verify_admin(&self, username: &str, password: &str) -> StoreResult<bool> {
        let client = self.client()?;
        let req = client
            .post(self.url("auth/login"))
            .json(&json!({ "username": username, "password": password }));
        let resp = self.send(req)?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let body = Self::read_json(Self::expect_success(resp)?)?;
        Ok(body.get("success").and_then(Value::as_bool).unwrap_or(false))
    }

    fn settings_get(&self) -> StoreResult<Option<Document>> {
        let client = self.client()?;
        let resp = self.send(client.get(self.url("settings")))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(document::from_value(Self::read_json(Self::expect_success(resp)?)?)
            .filter(|s| !s.is_empty()))
    }

    fn settings_update(&self, patch: Document) -> StoreResult<()> {
        let client = self.client()?;
        let resp = self.send(client.put(self.url("settings")).json(&patch))?;
        Self::expect_success(resp)?;
        Ok(())
    }
}
