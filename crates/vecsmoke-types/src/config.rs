//! Configuration loading for vecsmoke.
//!
//! Layered config, later layers win:
//! 1. Built-in defaults
//! 2. Config file (~/.config/vecsmoke/config.toml)
//! 3. CLI-specified config file
//! 4. Environment variables (VECSMOKE_*, nested keys separated by `__`)
//! 5. CLI flags, applied by the caller
//!
//! The bare `HOST` and `API_KEY` variables are honoured as a fallback when
//! neither a config layer nor `VECSMOKE_*` provides them.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::collection::{CollectionSpec, Distance};
use crate::error::SmokeError;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VECSMOKE";

/// Fallback variable for the service host.
pub const FALLBACK_HOST_VAR: &str = "HOST";

/// Fallback variable for the API credential.
pub const FALLBACK_API_KEY_VAR: &str = "API_KEY";

/// What to do with a collection that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPolicy {
    /// Create when absent, otherwise verify parameters and reuse
    #[default]
    Ensure,
    /// Delete when present, then create fresh
    Recreate,
}

impl fmt::Display for CollectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionPolicy::Ensure => write!(f, "ensure"),
            CollectionPolicy::Recreate => write!(f, "recreate"),
        }
    }
}

/// Settings for a smoke-test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Service host, optionally with scheme (required before any network call)
    #[serde(default)]
    pub host: Option<String>,

    /// Service port (REST)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use https when the host has no scheme
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,

    /// API credential (absent for unauthenticated deployments)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Vector dimensionality
    #[serde(default = "default_vector_size")]
    pub vector_size: u64,

    /// Distance metric
    #[serde(default)]
    pub distance: Distance,

    /// Maximum number of search results
    #[serde(default = "default_search_limit")]
    pub search_limit: u64,

    /// Existing-collection policy
    #[serde(default)]
    pub policy: CollectionPolicy,

    /// Delete the collection after a successful run
    #[serde(default)]
    pub cleanup: bool,

    /// JSON sample file replacing the built-in points
    #[serde(default)]
    pub points_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    6333
}

fn default_use_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_collection() -> String {
    "vecsmoke_test_collection".to_string()
}

fn default_vector_size() -> u64 {
    4
}

fn default_search_limit() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            use_tls: default_use_tls(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            collection: default_collection(),
            vector_size: default_vector_size(),
            distance: Distance::default(),
            search_limit: default_search_limit(),
            policy: CollectionPolicy::default(),
            cleanup: false,
            points_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, config files and the process environment.
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, SmokeError> {
        Self::load_with_env(cli_config_path, None)
    }

    /// Load settings reading variables from `env` instead of the process
    /// environment when given.
    pub fn load_with_env(
        cli_config_path: Option<&str>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, SmokeError> {
        let config_dir = ProjectDirs::from("", "", "vecsmoke")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("port", default_port() as i64)
            .map_err(|e| SmokeError::Config(e.to_string()))?
            .set_default("collection", default_collection())
            .map_err(|e| SmokeError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| SmokeError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // VECSMOKE_HOST, VECSMOKE_API_KEY, VECSMOKE_SEARCH_LIMIT, ...
        // No try_parsing: string fields (api_key, collection) must arrive verbatim.
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(env.clone()),
        );

        let config = builder
            .build()
            .map_err(|e| SmokeError::Config(e.to_string()))?;

        let mut settings: Settings = config
            .try_deserialize()
            .map_err(|e| SmokeError::Config(e.to_string()))?;

        settings.apply_fallback_env(|key| match &env {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        });

        Ok(settings)
    }

    /// Fill host and credential from the bare `HOST` / `API_KEY` variables
    /// when no other layer set them. Empty values count as unset.
    pub fn apply_fallback_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.host.as_deref().map_or(true, str::is_empty) {
            self.host = lookup(FALLBACK_HOST_VAR).filter(|v| !v.is_empty());
        }
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            self.api_key = lookup(FALLBACK_API_KEY_VAR).filter(|v| !v.is_empty());
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SmokeError> {
        if self.collection.trim().is_empty() {
            return Err(SmokeError::Config("collection must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(SmokeError::Config("port must be > 0".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(SmokeError::Config("timeout_secs must be > 0".to_string()));
        }
        if self.vector_size == 0 {
            return Err(SmokeError::Config("vector_size must be > 0".to_string()));
        }
        if self.search_limit == 0 {
            return Err(SmokeError::Config("search_limit must be > 0".to_string()));
        }
        Ok(())
    }

    /// Host, or a configuration error when it is missing.
    pub fn require_host(&self) -> Result<&str, SmokeError> {
        self.host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                SmokeError::Config(format!(
                    "host is not set (use --host, {}_HOST or {})",
                    ENV_PREFIX, FALLBACK_HOST_VAR
                ))
            })
    }

    /// Base URL of the REST endpoint.
    ///
    /// A host that already carries a scheme is used as given.
    pub fn endpoint_url(&self) -> Result<String, SmokeError> {
        let host = self.require_host()?;
        if host.contains("://") {
            return Ok(host.trim_end_matches('/').to_string());
        }
        let scheme = if self.use_tls { "https" } else { "http" };
        Ok(format!("{}://{}:{}", scheme, host, self.port))
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Collection spec described by these settings.
    pub fn collection_spec(&self) -> CollectionSpec {
        CollectionSpec::new(self.collection.clone(), self.vector_size, self.distance)
    }

    /// Copy with the credential masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api_key.is_some() {
            copy.api_key = Some("********".to_string());
        }
        copy
    }
}
