//! Request authentication
//!
//! Static bearer tokens and admin secrets are attached as-is. Client
//! credentials are exchanged for an access token that is cached until shortly
//! before it expires.

use crate::config::Credentials;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Token response from the OAuth2 token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Valid with a 60-second buffer
    fn is_valid(&self) -> bool {
        self.expires_at > Instant::now() + Duration::from_secs(60)
    }
}

/// Fetches and caches client-credential access tokens
#[derive(Debug)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    token_url: String,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(
        client_id: String,
        client_secret: String,
        token_url: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            token_url,
            http_client,
            cached_token: RwLock::new(None),
        }
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn get_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        let new_token = self.fetch_token().await?;
        let expires_in = new_token.expires_in.unwrap_or(3600);
        tracing::debug!(expires_in, "Fetched access token");

        *cached = Some(CachedToken {
            access_token: new_token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });

        Ok(new_token.access_token)
    }

    async fn fetch_token(&self) -> Result<TokenResponse> {
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "Token request failed with status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Force a refresh on next use
    pub async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }
}

#[derive(Debug)]
enum Auth {
    None,
    Bearer(String),
    AdminSecret(String),
    Token(TokenManager),
}

/// HTTP client wrapper that attaches credentials to every request
#[derive(Debug)]
pub struct AuthenticatedClient {
    http_client: reqwest::Client,
    auth: Auth,
}

impl AuthenticatedClient {
    pub fn new(http_client: reqwest::Client, credentials: &Credentials) -> Self {
        let auth = match credentials {
            Credentials::None => Auth::None,
            Credentials::Bearer(token) => Auth::Bearer(token.clone()),
            Credentials::AdminSecret(secret) => Auth::AdminSecret(secret.clone()),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
                token_url,
            } => Auth::Token(TokenManager::new(
                client_id.clone(),
                client_secret.clone(),
                token_url.clone(),
                http_client.clone(),
            )),
        };

        Self { http_client, auth }
    }

    /// Get a request builder with authentication applied
    pub async fn request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder> {
        let builder = self.http_client.request(method, url);

        Ok(match &self.auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::AdminSecret(secret) => builder.header(ADMIN_SECRET_HEADER, secret),
            Auth::Token(manager) => builder.bearer_auth(manager.get_token().await?),
        })
    }

    /// Whether a 401 may be cured by fetching a new token
    pub fn can_refresh(&self) -> bool {
        matches!(self.auth, Auth::Token(_))
    }

    pub async fn invalidate_token(&self) {
        if let Auth::Token(manager) = &self.auth {
            manager.invalidate().await;
        }
    }
}
