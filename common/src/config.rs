// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, ConfigError, File, Environment};
use url::Url;

/// Central configuration for the dashboard proxy
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server_addr: String,
    pub log_level: String,
    /// Registers `/debug/session` when set
    pub debug_endpoints: bool,

    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub login_rate_limit: RateLimitConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// No timeout when absent
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secret: String,
    /// HMAC algorithm used to sign session tokens (HS256, HS384 or HS512)
    pub algorithm: String,
    pub max_age_secs: i64,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_attempts: usize,
    pub window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            log_level: "info".to_string(),
            debug_endpoints: false,
            backend: BackendConfig::default(),
            session: SessionConfig::default(),
            login_rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: "HS256".to_string(),
            max_age_secs: 30 * 24 * 60 * 60,
            cookie_name: "dashboard_session".to_string(),
            secure_cookie: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // APP__SESSION__SECRET, APP__BACKEND__BASE_URL, ...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files first, then fall back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::from_plain_env()
            }
        }
    }

    fn from_plain_env() -> Self {
        let defaults = Self::default();

        let web_server_addr = env::var("WEB_SERVER_ADDR")
            .unwrap_or(defaults.web_server_addr);

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or(defaults.log_level);

        let debug_endpoints = env::var("DEBUG_ENDPOINTS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let base_url = env::var("BACKEND_URL")
            .unwrap_or(defaults.backend.base_url);

        let timeout_secs = env::var("BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        let secret = env::var("SESSION_SECRET")
            .unwrap_or_default();

        Self {
            web_server_addr,
            log_level,
            debug_endpoints,
            backend: BackendConfig {
                base_url,
                timeout_secs,
            },
            session: SessionConfig {
                secret,
                ..defaults.session
            },
            login_rate_limit: defaults.login_rate_limit,
        }
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.trim().is_empty() {
            return Err(ConfigError::Message("session.secret must be set".into()));
        }

        if !matches!(self.session.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(ConfigError::Message(format!(
                "session.algorithm must be an HMAC algorithm, got {}",
                self.session.algorithm
            )));
        }

        if self.session.max_age_secs <= 0 {
            return Err(ConfigError::Message("session.max_age_secs must be positive".into()));
        }

        let url = Url::parse(&self.backend.base_url).map_err(|e| {
            ConfigError::Message(format!("backend.base_url is invalid: {}", e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Message(format!(
                "backend.base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }
}
