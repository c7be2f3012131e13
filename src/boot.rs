use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use crate::config::{Backend, Config};

#[derive(Debug, Default)]
pub struct BootReport {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl BootReport {
    fn warn(&mut self, msg: String) {
        warn!("  {}", msg);
        self.warnings.push(msg);
    }

    fn error(&mut self, msg: String) {
        error!("  {}", msg);
        self.errors.push(msg);
    }
}

/// Directories the configured backend writes into.
fn data_dirs(config: &Config) -> Vec<PathBuf> {
    let db = &config.database;
    match db.backend {
        Backend::Kv => db
            .kv_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| vec![p.to_path_buf()])
            .unwrap_or_default(),
        Backend::Local | Backend::Hybrid => vec![db.local_dir.clone()],
        Backend::Mongodb => Vec::new(),
    }
}

fn ensure_writable(dir: &Path, report: &mut BootReport) {
    if !dir.exists() {
        match fs::create_dir_all(dir) {
            Ok(_) => info!("  Created directory: {}", dir.display()),
            Err(e) => {
                report.error(format!("FAILED to create directory {}: {}", dir.display(), e));
                return;
            }
        }
    }
    let test_file = dir.join(".write_test");
    match fs::write(&test_file, "test") {
        Ok(_) => {
            let _ = fs::remove_file(&test_file);
        }
        Err(e) => report.error(format!("Directory {} not writable: {}", dir.display(), e)),
    }
}

/// Check the configuration and the filesystem it points at.
pub fn check(config: &Config) -> BootReport {
    let mut report = BootReport::default();
    let db = &config.database;

    // ── 1. Data directories ────────────────────────────
    for dir in data_dirs(config) {
        ensure_writable(&dir, &mut report);
    }

    // ── 2. Backend settings ────────────────────────────
    match db.backend {
        Backend::Mongodb => {
            if !db.uri.starts_with("mongodb://") && !db.uri.starts_with("mongodb+srv://") {
                report.error(format!("database.uri is not a MongoDB URI: {}", db.uri));
            }
            if db.name.trim().is_empty() {
                report.error("database.name is empty".to_string());
            }
        }
        Backend::Hybrid => {
            if !db.remote_url.starts_with("http://") && !db.remote_url.starts_with("https://") {
                report.error(format!("database.remote_url must be http(s): {}", db.remote_url));
            }
            if db.probe_timeout_ms == 0 {
                report.error("database.probe_timeout_ms must be positive".to_string());
            }
        }
        Backend::Kv | Backend::Local => {}
    }

    // ── 3. Admin credential ────────────────────────────
    if config.admin.username.trim().is_empty() || config.admin.password.is_empty() {
        report.error("admin.username and admin.password must be set".to_string());
    } else if config.admin.password == "admin123" {
        report.warn("admin.password is the default; change it in folio.toml".to_string());
    }

    // ── 4. Seed endpoint ───────────────────────────────
    if config.seed_token().is_none() {
        report.warn("seed.token not set; POST /api/init is open".to_string());
    }

    // ── 5. Rocket.toml exists ──────────────────────────
    if !Path::new("Rocket.toml").exists() {
        report.warn("Rocket.toml not found, using default config".to_string());
    }

    report
}

/// Run all boot checks. Call this before Rocket launches.
/// Aborts the process if any check fails.
pub fn run(config: &Config) {
    info!("Folio boot check starting...");

    let report = check(config);

    // ── Summary ────────────────────────────────────────
    if !report.errors.is_empty() {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors.len(),
            report.warnings.len()
        );
        process::exit(1);
    }

    if !report.warnings.is_empty() {
        warn!(
            "Boot check passed with {} warning(s).",
            report.warnings.len()
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("folio_boot_{}_{}", name, std::process::id()))
    }

    #[test]
    fn creates_local_data_dir() {
        let dir = temp_dir("local");
        let _ = fs::remove_dir_all(&dir);
        let mut config = Config::default();
        config.database.backend = Backend::Local;
        config.database.local_dir = dir.clone();
        let report = check(&config);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(dir.is_dir());
    }

    #[test]
    fn bad_hybrid_settings_are_errors() {
        let mut config = Config::default();
        config.database.backend = Backend::Hybrid;
        config.database.local_dir = temp_dir("hybrid");
        config.database.remote_url = "ftp://nope".into();
        config.database.probe_timeout_ms = 0;
        assert_eq!(check(&config).errors.len(), 2);
    }

    #[test]
    fn default_password_only_warns() {
        let mut config = Config::default();
        config.database.backend = Backend::Mongodb;
        let report = check(&config);
        assert!(report.errors.is_empty());
        assert!(report.warnings.iter().any(|w| w.contains("admin.password")));

        config.admin.password.clear();
        assert_eq!(check(&config).errors.len(), 1);
    }
}
