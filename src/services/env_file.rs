//! `.env` style key/value files
//!
//! Parsing is deliberately forgiving: anything that does not look like
//! `KEY=VALUE` is skipped rather than reported.

use crate::types::AppResult;
use base64::Engine;
use rand::Rng;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the application secret.
pub const APP_KEY: &str = "APP_KEY";

/// Raw secret length in bytes before encoding.
pub const APP_KEY_BYTES: usize = 32;

const APP_KEY_PREFIX: &str = "base64:";

/// Parsed key/value pairs. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: BTreeMap<String, String>,
}

impl EnvMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value for `key` unless it is missing or blank.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Layer `overrides` over the file values. An override wins for every
    /// key it names, including keys the file does not define.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.vars.extend(overrides);
        self
    }
}

impl FromIterator<(String, String)> for EnvMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// ignored, keys are trimmed and one pair of matching quotes around the value
/// is stripped. Lines without a separator are skipped. Later duplicates win.
pub fn parse(source: &str) -> EnvMap {
    let mut vars = BTreeMap::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = strip_export(line);
        let Some((key, value)) = line.split_once('=') else {
            tracing::debug!("Skipping env line {} without '='", idx + 1);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            tracing::debug!("Skipping env line {} with an empty key", idx + 1);
            continue;
        }

        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    EnvMap { vars }
}

/// Read and parse an env file.
pub fn load(path: &Path) -> AppResult<EnvMap> {
    let contents = fs::read_to_string(path)?;
    let env = parse(&contents);
    tracing::debug!("Loaded {} entries from {}", env.len(), path.display());
    Ok(env)
}

/// Make sure the env file exists and carries an application secret.
///
/// A missing file is seeded from a sibling `.env.example` when there is one.
/// When `APP_KEY` is absent or blank a fresh key is written in place of the
/// first `APP_KEY` line (or appended) and any other `APP_KEY` lines are
/// dropped. Returns `true` when a key was generated.
pub fn ensure_app_key(path: &Path) -> AppResult<bool> {
    if !path.exists() {
        seed_env_file(path)?;
    }

    let contents = fs::read_to_string(path)?;
    if parse(&contents).non_empty(APP_KEY).is_some() {
        return Ok(false);
    }

    let entry = format!("{}={}", APP_KEY, generate_app_key());
    let mut written = false;
    let mut lines: Vec<&str> = Vec::new();
    for line in contents.lines() {
        if defines_key(line, APP_KEY) {
            if !written {
                lines.push(&entry);
                written = true;
            }
            continue;
        }
        lines.push(line);
    }
    if !written {
        lines.push(&entry);
    }

    let mut output = lines.join("\n");
    output.push('\n');
    fs::write(path, output)?;

    tracing::info!("🔑 Generated a new {} in {}", APP_KEY, path.display());
    Ok(true)
}

/// A fresh `base64:`-prefixed secret.
pub fn generate_app_key() -> String {
    let mut key = [0u8; APP_KEY_BYTES];
    rand::thread_rng().fill(&mut key[..]);
    format!(
        "{}{}",
        APP_KEY_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(key)
    )
}

/// Whether `value` looks like a key produced by [`generate_app_key`].
pub fn is_well_formed_key(value: &str) -> bool {
    value
        .strip_prefix(APP_KEY_PREFIX)
        .and_then(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded).ok())
        .is_some_and(|raw| raw.len() == APP_KEY_BYTES)
}

/// `.env.example` next to the given env file.
pub fn example_path(path: &Path) -> PathBuf {
    path.with_file_name(".env.example")
}

fn seed_env_file(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let example = example_path(path);
    if example.exists() {
        fs::copy(&example, path)?;
        tracing::info!("Created {} from {}", path.display(), example.display());
    } else {
        fs::write(path, "")?;
        tracing::warn!("No env file at {}; created an empty one", path.display());
    }
    Ok(())
}

fn defines_key(line: &str, key: &str) -> bool {
    strip_export(line.trim())
        .split_once('=')
        .is_some_and(|(k, _)| k.trim() == key)
}

fn strip_export(line: &str) -> &str {
    line.strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(line)
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &value[1..value.len() - 1];
        }
    }
    value
}
