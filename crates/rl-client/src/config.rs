//! Client configuration

use crate::error::{Error, Result};
use rl_config::GraphQlConfig;
use std::time::Duration;

/// How requests are authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    Bearer(String),
    /// Hasura admin secret, sent as `x-hasura-admin-secret`
    AdminSecret(String),
    /// OAuth2 client credentials grant
    ClientCredentials {
        client_id: String,
        client_secret: String,
        token_url: String,
    },
}

/// Configuration for the GraphQL client
#[derive(Debug, Clone)]
pub struct Config {
    /// GraphQL endpoint URL
    pub endpoint: String,

    pub credentials: Credentials,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum attempts per request
    pub retry_attempts: u32,

    /// Initial retry delay, doubled after each attempt
    pub retry_delay: Duration,

    pub user_agent: String,
}

impl Config {
    /// Create a new configuration for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials: Credentials::None,
            timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(100),
            user_agent: format!("rolelist/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Build from the `[graphql]` section of the application config
    pub fn from_app(graphql: &GraphQlConfig) -> Result<Self> {
        let auth = &graphql.auth;
        let credentials = match (
            &auth.bearer_token,
            &auth.admin_secret,
            &auth.client_id,
            &auth.client_secret,
        ) {
            (Some(token), None, None, None) => Credentials::Bearer(token.clone()),
            (None, Some(secret), None, None) => Credentials::AdminSecret(secret.clone()),
            (None, None, Some(client_id), Some(client_secret)) => {
                let token_url = auth.token_url.clone().ok_or_else(|| {
                    Error::Config("graphql.auth.token_url is required for client credentials".into())
                })?;
                Credentials::ClientCredentials {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    token_url,
                }
            }
            (None, None, None, None) => Credentials::None,
            _ => {
                return Err(Error::Config(
                    "graphql.auth: conflicting or incomplete credentials".into(),
                ))
            }
        };

        let mut config = Self::new(graphql.endpoint.clone())
            .with_credentials(credentials)
            .with_timeout(graphql.timeout())
            .with_retry(graphql.retry_attempts, graphql.retry_delay());
        if let Some(user_agent) = &graphql.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        Ok(config)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Shorthand for [`Credentials::Bearer`]
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_credentials(Credentials::Bearer(token.into()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry configuration
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8080/v1/graphql")
    }
}
