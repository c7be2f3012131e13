//! Service configuration, read from `folio.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::store::remote::DEFAULT_PROBE_TIMEOUT;

pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where content is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Mongodb,
    Kv,
    Local,
    Hybrid,
}

impl Backend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Some(Backend::Mongodb),
            "kv" | "sqlite" => Some(Backend::Kv),
            "local" => Some(Backend::Local),
            "hybrid" => Some(Backend::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name the assistant speaks for
    #[serde(default = "default_owner")]
    pub owner: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// MongoDB connection string
    #[serde(default = "default_mongo_uri")]
    pub uri: String,

    /// MongoDB database name
    #[serde(default = "default_db_name")]
    pub name: String,

    /// SQLite file behind the key-value store
    #[serde(default = "default_kv_path")]
    pub kv_path: PathBuf,

    /// Directory of the local JSON collection files
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Base URL of the remote `/api` for the hybrid backend
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Budget for the one-time remote availability probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            uri: default_mongo_uri(),
            name: default_db_name(),
            kv_path: default_kv_path(),
            local_dir: default_local_dir(),
            remote_url: default_remote_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Seed sample content at startup when the store is empty
    #[serde(default = "default_true")]
    pub auto: bool,

    /// When set, `POST /api/init` requires a matching `x-seed-token` header
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            auto: true,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
        }
    }
}

fn default_owner() -> String { "Alex".into() }
fn default_backend() -> Backend { Backend::Kv }
fn default_mongo_uri() -> String { "mongodb://localhost:27017".into() }
fn default_db_name() -> String { "portfolio".into() }
fn default_kv_path() -> PathBuf { PathBuf::from("data/kv.db") }
fn default_local_dir() -> PathBuf { PathBuf::from("data/local") }
fn default_remote_url() -> String { "http://localhost:8000/api".into() }
fn default_probe_timeout_ms() -> u64 { DEFAULT_PROBE_TIMEOUT.as_millis() as u64 }
fn default_true() -> bool { true }
fn default_admin_username() -> String { "admin".into() }
fn default_admin_password() -> String { "admin123".into() }

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
            Self::from_toml(&raw)?
        } else {
            log::info!("{} not found, using defaults", path.display());
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from `MONGODB_URI`, `MONGODB_DB`, `SEED_TOKEN`,
    /// `FOLIO_BACKEND` and `FOLIO_REMOTE_URL`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(uri) = set("MONGODB_URI") {
            self.database.uri = uri;
        }
        if let Some(name) = set("MONGODB_DB") {
            self.database.name = name;
        }
        if let Some(token) = set("SEED_TOKEN") {
            self.seed.token = Some(token);
        }
        if let Some(url) = set("FOLIO_REMOTE_URL") {
            self.database.remote_url = url;
        }
        if let Some(raw) = set("FOLIO_BACKEND") {
            match Backend::parse(&raw) {
                Some(backend) => self.database.backend = backend,
                None => log::warn!("Ignoring unknown FOLIO_BACKEND '{}'", raw),
            }
        }
    }

    /// Seed token, if one is set and non-empty.
    pub fn seed_token(&self) -> Option<&str> {
        self.seed.token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.database.backend, Backend::Kv);
        assert_eq!(config.database.name, "portfolio");
        assert_eq!(config.database.probe_timeout(), Duration::from_millis(2000));
        assert!(config.seed.auto);
        assert_eq!(config.seed_token(), None);
        assert_eq!(config.admin.username, "admin");
    }

    #[test]
    fn tables_override_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            owner = "Sam"

            [database]
            backend = "hybrid"
            remote_url = "https://example.com/api"
            probe_timeout_ms = 500

            [seed]
            auto = false
            token = "t0k"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.owner, "Sam");
        assert_eq!(config.database.backend, Backend::Hybrid);
        assert_eq!(config.database.remote_url, "https://example.com/api");
        assert_eq!(config.database.probe_timeout_ms, 500);
        assert!(!config.seed.auto);
        assert_eq!(config.seed_token(), Some("t0k"));
        // untouched tables keep defaults
        assert_eq!(config.admin.password, "admin123");
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(Config::from_toml("[database]\nbackend = \"redis\"").is_err());
    }

    #[test]
    fn environment_wins_over_file() {
        let env: HashMap<&str, &str> = [
            ("MONGODB_URI", "mongodb://db:27017"),
            ("MONGODB_DB", "site"),
            ("SEED_TOKEN", "secret"),
            ("FOLIO_BACKEND", "mongo"),
            ("FOLIO_REMOTE_URL", ""),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database.uri, "mongodb://db:27017");
        assert_eq!(config.database.name, "site");
        assert_eq!(config.seed_token(), Some("secret"));
        assert_eq!(config.database.backend, Backend::Mongodb);
        // blank values are ignored
        assert_eq!(config.database.remote_url, "http://localhost:8000/api");
    }

    #[test]
    fn bad_backend_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|k| (k == "FOLIO_BACKEND").then(|| "cassandra".to_string()));
        assert_eq!(config.database.backend, Backend::Kv);
    }
}
