//! Configuration for the circuitstats dashboard.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then environment variables. Translates into
//! `circuitstats_core::ServiceConfig` for the stats service and into a
//! listen address for the HTTP server.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use circuitstats_core::ServiceConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no Mist API token configured (set MIST_APITOKEN)")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Everything the dashboard reads at startup.
///
/// Field names match the lowercased environment keys: `MIST_APITOKEN`
/// fills `apitoken`, `PORT` fills `port`, and so on.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// One token or a comma-separated list, tried in order on rate limits.
    #[serde(default)]
    pub apitoken: Option<SecretString>,

    /// Organization to report on; auto-detected when unset.
    #[serde(default)]
    pub org_id: Option<String>,

    /// Mist cloud host (`api.mist.com`, `api.eu.mist.com`, ...).
    #[serde(default = "default_host")]
    pub host: String,

    /// Upstream request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            apitoken: None,
            org_id: None,
            host: default_host(),
            timeout: default_timeout(),
            port: default_port(),
            bind_address: default_bind_address(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    circuitstats_core::config::DEFAULT_HOST.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_port() -> u16 {
    5000
}
fn default_bind_address() -> String {
    "0.0.0.0".into()
}
fn default_log_level() -> String {
    "INFO".into()
}

impl Config {
    /// Configured tokens in rotation order, blanks dropped.
    pub fn tokens(&self) -> Vec<SecretString> {
        self.apitoken
            .as_ref()
            .map(|raw| {
                raw.expose_secret()
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| SecretString::from(t.to_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The organization id, if one was given and isn't blank.
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// `tracing` filter directive for the configured level.
    pub fn log_filter(&self) -> String {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "warning" => "warn".into(),
            "critical" | "fatal" => "error".into(),
            "" => "info".into(),
            other => other.to_owned(),
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "bind_address".into(),
                reason: format!("not an IP address: {}", self.bind_address),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Build the stats service configuration.
    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let tokens = self.tokens();
        if tokens.is_empty() {
            return Err(ConfigError::NoCredentials);
        }
        Ok(ServiceConfig {
            host: self.host.trim().to_owned(),
            tokens,
            org_id: self.org_id().map(str::to_owned),
            timeout: Duration::from_secs(self.timeout),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "host".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "circuitstats", "circuitstats").map_or_else(
        || PathBuf::from("circuitstats.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The provider chain: TOML file, then `MIST_*`, then the bare server
/// variables. Fields missing everywhere take their serde defaults.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("MIST_").only(&["apitoken", "org_id", "host", "timeout"]))
        .merge(Env::raw().only(&["port", "bind_address", "log_level"]))
}

/// Extract and validate a [`Config`] from any figment.
pub fn from_figment(figment: &Figment) -> Result<Config, ConfigError> {
    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load the config from the file at `path` (or the default location)
/// plus the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    from_figment(&figment(path))
}
