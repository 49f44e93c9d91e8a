use crate::services::env_file::{self, EnvMap, APP_KEY};
use crate::types::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application secret. Never printed, never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Keys read from the env file. Process environment variables override these
/// and nothing else.
pub const CONFIG_KEYS: [&str; 10] = [
    APP_KEY,
    "APP_NAME",
    "APP_DEBUG",
    "HOST",
    "PORT",
    "QUERY_BACKEND_URL",
    "QUERY_BACKEND_TIMEOUT_SECS",
    "STORAGE_PATH",
    "CORS_ALLOWED_ORIGINS",
    "CHAT_TITLE",
];

/// Process-wide configuration, built once at startup and shared by `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub app_name: String,
    #[serde(skip)]
    pub app_key: Secret,
    pub debug: bool,

    // Server
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,

    // Query backend; `None` runs the offline backend
    pub backend_url: Option<String>,
    pub backend_timeout_secs: u64,

    // Filesystem
    pub storage_path: PathBuf,
    pub env_path: PathBuf,

    // Widget
    pub chat_title: String,
}

impl Config {
    /// Provision the secret if needed, read the env file, apply overrides
    /// from the process environment and build the typed config.
    pub fn load<I>(env_path: &Path, overrides: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        env_file::ensure_app_key(env_path)
            .map_err(|e| AppError::startup(format!("Cannot provision {}: {}", APP_KEY, e.message())))?;
        let env = env_file::load(env_path)?.with_overrides(known_keys(overrides));
        Self::from_env_map(&env, env_path)
    }

    pub fn from_env_map(env: &EnvMap, env_path: &Path) -> AppResult<Self> {
        let app_key = env
            .non_empty(APP_KEY)
            .map(Secret::new)
            .ok_or_else(|| AppError::config(format!("{} is missing", APP_KEY)))?;

        let port = match env.non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => 3000,
        };

        let backend_timeout_secs = match env.non_empty("QUERY_BACKEND_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::config(format!("QUERY_BACKEND_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?,
            None => 30,
        };

        let storage_path = env
            .non_empty("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| env_path.parent().unwrap_or(Path::new(".")).join("storage"));

        Ok(Config {
            app_name: env.non_empty("APP_NAME").unwrap_or("Chatbot").to_string(),
            app_key,
            debug: env.get("APP_DEBUG").is_some_and(parse_flag),
            host: env.non_empty("HOST").unwrap_or("127.0.0.1").to_string(),
            port,
            cors_origins: env
                .get("CORS_ALLOWED_ORIGINS")
                .map(split_list)
                .unwrap_or_default(),
            backend_url: env.non_empty("QUERY_BACKEND_URL").map(|s| s.trim().to_string()),
            backend_timeout_secs,
            storage_path,
            env_path: env_path.to_path_buf(),
            chat_title: env.non_empty("CHAT_TITLE").unwrap_or("Chat with us").to_string(),
        })
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What the error-only server needs when [`Config::load`] or state setup
/// failed. Read best-effort from the same sources; nothing is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupFallback {
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

impl StartupFallback {
    pub fn resolve<I>(env_path: &Path, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = env_file::load(env_path)
            .unwrap_or_default()
            .with_overrides(known_keys(overrides));

        Self {
            host: env.non_empty("HOST").unwrap_or("127.0.0.1").trim().to_string(),
            port: env
                .non_empty("PORT")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(3000),
            debug: env.get("APP_DEBUG").is_some_and(parse_flag),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn known_keys<I>(overrides: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    overrides
        .into_iter()
        .filter(|(key, _)| CONFIG_KEYS.contains(&key.as_str()))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
