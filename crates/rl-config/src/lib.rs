//! Rolelist Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub graphql: GraphQlConfig,
    pub store: StoreConfig,
    pub defaults: DefaultsConfig,
}

/// GraphQL endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphQlConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub user_agent: Option<String>,
    pub auth: AuthConfig,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/graphql".to_string(),
            timeout_secs: 30,
            retry_attempts: 3,
            retry_delay_ms: 100,
            user_agent: None,
            auth: AuthConfig::default(),
        }
    }
}

impl GraphQlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Credentials for the GraphQL endpoint.
///
/// At most one of the three mechanisms may be configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Static bearer token
    pub bearer_token: Option<String>,

    /// Value for the `x-hasura-admin-secret` header
    pub admin_secret: Option<String>,

    /// OAuth2 client credentials
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
}

impl AuthConfig {
    fn mechanisms(&self) -> usize {
        [
            self.bearer_token.is_some(),
            self.admin_secret.is_some(),
            self.client_id.is_some() || self.client_secret.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Role list store behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of roles fetched per page
    pub page_limit: u32,

    /// Minimum spacing between page loads
    pub throttle_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_limit: 20,
            throttle_ms: 500,
        }
    }
}

impl StoreConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

/// Values the filters reset to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub time_commitment_min: u32,
    pub time_commitment_max: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            time_commitment_min: 0,
            time_commitment_max: 40,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graphql.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "graphql.endpoint must not be empty".to_string(),
            ));
        }
        if !self.graphql.endpoint.starts_with("http://")
            && !self.graphql.endpoint.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "graphql.endpoint must be an http(s) URL, got {}",
                self.graphql.endpoint
            )));
        }
        if self.graphql.retry_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "graphql.retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.graphql.auth.mechanisms() > 1 {
            return Err(ConfigError::ValidationError(
                "graphql.auth: configure only one of bearer_token, admin_secret or client credentials"
                    .to_string(),
            ));
        }
        if self.graphql.auth.client_id.is_some() != self.graphql.auth.client_secret.is_some() {
            return Err(ConfigError::ValidationError(
                "graphql.auth: client_id and client_secret must be set together".to_string(),
            ));
        }
        if self.store.page_limit == 0 {
            return Err(ConfigError::ValidationError(
                "store.page_limit must be greater than zero".to_string(),
            ));
        }
        if self.defaults.time_commitment_min > self.defaults.time_commitment_max {
            return Err(ConfigError::ValidationError(format!(
                "defaults: time_commitment_min ({}) exceeds time_commitment_max ({})",
                self.defaults.time_commitment_min, self.defaults.time_commitment_max
            )));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Rolelist Configuration
# Environment variables (ROLELIST_*) override these settings

[graphql]
endpoint = "http://localhost:8080/v1/graphql"
timeout_secs = 30
retry_attempts = 3
retry_delay_ms = 100

[graphql.auth]
# bearer_token = ""
# admin_secret = ""
# client_id = ""
# client_secret = ""
# token_url = ""

[store]
page_limit = 20
throttle_ms = 500

[defaults]
time_commitment_min = 0
time_commitment_max = 40
"#
        .to_string()
    }
}
