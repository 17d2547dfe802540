use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const TIMEOUT_VAR: &str = "FITLOG_HTTP_TIMEOUT_SECS";
pub const SESSION_PATH_VAR: &str = "FITLOG_SESSION_PATH";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Startup configuration problems. All of them are fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Environment variable {0} is empty")]
    Empty(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Could not find home directory")]
    NoHomeDir,
}

/// Backend endpoint and credentials, read once at startup
#[derive(Clone)]
pub struct Config {
    /// Project URL without a trailing slash
    pub supabase_url: String,
    pub anon_key: String,
    pub timeout_seconds: u64,
    pub session_path: PathBuf,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase_url = required(&lookup, SUPABASE_URL_VAR)?
            .trim_end_matches('/')
            .to_string();
        if !(supabase_url.starts_with("https://") || supabase_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                name: SUPABASE_URL_VAR,
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let anon_key = required(&lookup, SUPABASE_ANON_KEY_VAR)?;

        let timeout_seconds = match optional(&lookup, TIMEOUT_VAR) {
            Some(raw) => raw.parse::<u64>().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                ConfigError::Invalid {
                    name: TIMEOUT_VAR,
                    reason: format!("'{}' is not a positive number of seconds", raw),
                }
            })?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        let session_path = match optional(&lookup, SESSION_PATH_VAR) {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir()?.join("session.toml"),
        };

        Ok(Config {
            supabase_url,
            anon_key,
            timeout_seconds,
            session_path,
        })
    }

    /// Get config directory path (~/.fitlog/)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".fitlog"))
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("anon_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("session_path", &self.session_path)
            .finish()
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Err(ConfigError::Missing(name)),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(value) => Ok(value.trim().to_string()),
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
