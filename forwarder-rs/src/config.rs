//! Configuration for forwarder-rs
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in development defaults
//! 2. an optional TOML file
//! 3. `FORWARDER__<SECTION>__<KEY>` environment variables
//! 4. the short variables operators already use (`DA_URL`, `DA_USER`,
//!    `DA_PASS`, `DA_DOMAIN`, `APP_USERNAME`, `APP_PASSWORD`, `SECRET_KEY`,
//!    `LISTEN_ADDR`)
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0:5000"
//!
//! [directadmin]
//! url = "https://panel.example.com:2222"
//! user = "admin"
//! password = "secret"
//! domain = "example.com"
//!
//! [auth]
//! username = "operator"
//! password = "change-me"
//! session_secret = "long-random-string"
//! ```

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{ForwarderError, Result};

/// Session secret shipped in the defaults; never used to sign anything
const PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// Length of a generated session secret
const GENERATED_SECRET_LEN: usize = 64;

/// Short environment variables mapped onto config keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DA_URL", "directadmin.url"),
    ("DA_USER", "directadmin.user"),
    ("DA_PASS", "directadmin.password"),
    ("DA_DOMAIN", "directadmin.domain"),
    ("APP_USERNAME", "auth.username"),
    ("APP_PASSWORD", "auth.password"),
    ("SECRET_KEY", "auth.session_secret"),
    ("LISTEN_ADDR", "server.listen_addr"),
];

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP listener
    pub server: ServerConfig,
    /// DirectAdmin panel connection
    pub directadmin: DirectAdminConfig,
    /// Operator login
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:5000")
    pub listen_addr: String,
}

/// DirectAdmin panel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectAdminConfig {
    /// Panel base URL including port (e.g., "https://panel.example.com:2222")
    pub url: String,
    /// Panel account used for basic auth
    pub user: String,
    /// Panel account password
    pub password: String,
    /// Domain whose forwarders are managed
    pub domain: String,
    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Skip TLS certificate verification (self-signed panels)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Operator login configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// HMAC secret for session tokens
    pub session_secret: String,
    /// Session lifetime in hours
    #[serde(default = "default_session_hours")]
    pub session_hours: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_session_hours() -> u64 {
    12
}

impl DirectAdminConfig {
    /// Full URL of a panel command, e.g. `CMD_API_EMAIL_FORWARDERS`
    pub fn endpoint(&self, command: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), command)
    }
}

impl Config {
    /// Load the layered configuration from the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load the layered configuration, resolving short variables through `lookup`
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::development())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FORWARDER").separator("__"),
        );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(*var))?;
        }

        let mut config: Config = builder.build()?.try_deserialize()?;
        if config.auth.session_secret == PLACEHOLDER_SECRET {
            warn!("No session secret configured; using a random one, sessions end on restart");
            config.auth.session_secret = random_secret();
        }

        config.validate()?;
        config.warn_insecure_defaults();
        Ok(config)
    }

    /// Create a default development configuration
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:5000".to_string(),
            },
            directadmin: DirectAdminConfig {
                url: "https://your-server.com:2222".to_string(),
                user: "admin".to_string(),
                password: "password".to_string(),
                domain: "example.com".to_string(),
                timeout_seconds: default_timeout(),
                accept_invalid_certs: false,
            },
            auth: AuthConfig {
                username: "admin".to_string(),
                password: "admin".to_string(),
                session_secret: PLACEHOLDER_SECRET.to_string(),
                session_hours: default_session_hours(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.directadmin.url).map_err(|e| {
            ForwarderError::Config(format!(
                "Invalid DirectAdmin URL '{}': {}",
                self.directadmin.url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ForwarderError::Config(format!(
                "DirectAdmin URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.directadmin.domain.trim().is_empty() {
            return Err(ForwarderError::Config("No domain configured".to_string()));
        }

        if self.directadmin.timeout_seconds == 0 {
            return Err(ForwarderError::Config(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        if self.auth.username.trim().is_empty() {
            return Err(ForwarderError::Config("No operator username configured".to_string()));
        }

        if self.auth.session_secret.is_empty() {
            return Err(ForwarderError::Config("session_secret must not be empty".to_string()));
        }

        Ok(())
    }

    fn warn_insecure_defaults(&self) {
        let defaults = Self::development();

        if self.auth.password == defaults.auth.password {
            warn!("Using the default operator password; set APP_PASSWORD");
        }
        if self.directadmin.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for DirectAdmin");
        }
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::development()
    }
}
