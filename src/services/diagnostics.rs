//! Read-only environment checks
//!
//! Descriptive tooling only; nothing on the request path depends on it.

use crate::config::Config;
use crate::services::env_file;
use serde::Serialize;
use std::fs;

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub passed: bool,
    pub checks: Vec<Check>,
}

impl DiagnosticsReport {
    pub fn failed(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

pub fn run(config: &Config) -> DiagnosticsReport {
    let checks = vec![
        runtime_check(),
        backend_check(config),
        config_check(config),
        secret_check(config),
        storage_check(config),
    ];

    let report = DiagnosticsReport {
        passed: checks.iter().all(|c| c.passed),
        checks,
    };

    for check in report.failed() {
        tracing::warn!("Diagnostic '{}' failed: {}", check.name, check.detail);
    }

    report
}

fn runtime_check() -> Check {
    Check::new(
        "runtime",
        true,
        format!(
            "{} {} on {}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
    )
}

fn backend_check(config: &Config) -> Check {
    match &config.backend_url {
        Some(url) => match reqwest::Url::parse(url) {
            Ok(parsed) => Check::new(
                "query_backend",
                true,
                format!("upstream at {}", parsed.host_str().unwrap_or("unknown host")),
            ),
            Err(e) => Check::new("query_backend", false, format!("QUERY_BACKEND_URL is invalid: {}", e)),
        },
        None => Check::new("query_backend", false, "QUERY_BACKEND_URL is not set"),
    }
}

fn config_check(config: &Config) -> Check {
    if config.env_path.is_file() {
        Check::new("configuration", true, format!("{} present", config.env_path.display()))
    } else {
        Check::new("configuration", false, format!("{} missing", config.env_path.display()))
    }
}

fn secret_check(config: &Config) -> Check {
    let key = config.app_key.expose();
    if key.trim().is_empty() {
        Check::new("app_key", false, "APP_KEY is missing")
    } else if env_file::is_well_formed_key(key) {
        Check::new("app_key", true, "APP_KEY is set")
    } else {
        Check::new("app_key", true, "APP_KEY is set (not in generated format)")
    }
}

fn storage_check(config: &Config) -> Check {
    let dir = &config.storage_path;
    let probe = dir.join(".write-probe");
    let result = fs::create_dir_all(dir)
        .and_then(|_| fs::write(&probe, b"ok"))
        .and_then(|_| fs::remove_file(&probe));

    match result {
        Ok(()) => Check::new("storage", true, format!("{} writable", dir.display())),
        Err(e) => Check::new("storage", false, format!("{} not writable: {}", dir.display(), e)),
    }
}
