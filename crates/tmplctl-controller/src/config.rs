use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// Environment variable that allows an update which would delete observation data.
pub const FORCE_UPDATE_ENV: &str = "TMPLCTL_FORCE_UPDATE";

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub service_secret_key: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".into());
        }
        if let Err(e) = url::Url::parse(self.base_url.trim()) {
            return Err(format!("base_url is not a valid URL: {e}"));
        }
        if self.service_id.trim().is_empty() {
            return Err("service_id must not be empty".into());
        }
        if self.service_secret_key.trim().is_empty() {
            return Err("service_secret_key must not be empty".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.http.timeout_ms == 0 {
            return Err("http.timeout_ms must be > 0".into());
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("service_id", &self.service_id)
            .field("service_secret_key", &"[REDACTED]")
            .field("logging", &self.logging)
            .field("http", &self.http)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}
fn default_timeout_ms() -> u64 {
    30_000
}
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Where the destructive-update override comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceUpdate {
    /// Read [`FORCE_UPDATE_ENV`] on every update.
    #[default]
    Environment,
    Fixed(bool),
}

impl ForceUpdate {
    pub fn resolve(&self) -> Result<bool, ControllerError> {
        match self {
            Self::Fixed(force) => Ok(*force),
            Self::Environment => parse_force_update(std::env::var(FORCE_UPDATE_ENV).ok().as_deref()),
        }
    }
}

/// Unset or empty is `false`. Anything but a boolean literal is rejected.
pub fn parse_force_update(raw: Option<&str>) -> Result<bool, ControllerError> {
    let Some(raw) = raw.filter(|v| !v.is_empty()) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(ControllerError::invalid_force_update(raw)),
    }
}

pub mod loader {
    use super::ProviderConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<ProviderConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("tmplctl.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., TMPLCTL__BASE_URL=https://api.example.com
        builder = builder.add_source(
            Environment::with_prefix("TMPLCTL")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: ProviderConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
