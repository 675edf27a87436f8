//! GraphQL HTTP client

use crate::auth::AuthenticatedClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graphql::{GraphQlRequest, GraphQlResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Role service GraphQL client
///
/// Posts queries and mutations to a single endpoint with authentication and
/// unwraps the GraphQL response envelope. Queries are retried on rate
/// limiting and server errors; mutations are sent once.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    auth_client: Arc<AuthenticatedClient>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let auth_client = AuthenticatedClient::new(http_client, &config.credentials);

        Ok(Self {
            config: Arc::new(config),
            auth_client: Arc::new(auth_client),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Run a read-only GraphQL operation and return its `data` payload.
    ///
    /// Rate limiting, server errors and transport errors are retried up to
    /// the configured number of attempts.
    pub async fn execute<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        self.send(operation, query, variables, self.config.retry_attempts)
            .await
    }

    /// Run a mutation and return its `data` payload.
    ///
    /// Sent at most once: a lost response may still have been committed, so
    /// failures go straight to the caller. A rejected access token is the one
    /// exception, since the server refused the request before running it.
    pub async fn execute_once<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        self.send(operation, query, variables, 1).await
    }

    async fn send<V, T>(
        &self,
        operation: &str,
        query: &str,
        variables: V,
        max_attempts: u32,
    ) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest {
            query,
            variables,
            operation_name: Some(operation),
        };

        let mut last_error = None;
        let mut attempt = 0;
        let mut token_refreshed = false;

        while attempt < max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.config.retry_delay, attempt);
                debug!(operation, attempt, ?delay, "Retrying GraphQL request");
                tokio::time::sleep(delay).await;
            }

            let request = self
                .auth_client
                .request(reqwest::Method::POST, &self.config.endpoint)
                .await?
                .json(&body);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let envelope: GraphQlResponse<T> = response.json().await?;
                        return envelope.into_result(operation);
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        && !token_refreshed
                        && self.auth_client.can_refresh()
                    {
                        debug!(operation, "Access token rejected, refreshing");
                        self.auth_client.invalidate_token().await;
                        token_refreshed = true;
                        last_error = Some(Error::Authentication("Access token rejected".into()));
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    let error = Error::from_status(status, body);

                    if !error.is_retryable() {
                        return Err(error);
                    }

                    warn!(operation, %status, attempt, "GraphQL request failed");
                    last_error = Some(error);
                }
                Err(e) => {
                    warn!(operation, error = %e, attempt, "GraphQL transport error");
                    last_error = Some(Error::Http(e));
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or_else(|| Error::Other(format!("{} failed", operation))))
    }
}

/// Exponential backoff: `base`, `2 * base`, `4 * base`, ... saturating
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 4), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_saturates_for_large_attempts() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 32), base * (1 << 31));
        assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
        assert_eq!(backoff_delay(Duration::MAX, 3), Duration::MAX);
    }
}
