//! BaaS REST Client
//!
//! Thin typed wrapper over the hosted backend's REST and auth endpoints.
//! One client instance is shared by every store; clones share the HTTP
//! connection pool and the session token, so signing in on one clone is
//! visible to all of them.
//!
//! The client performs exactly one remote call per method and maps failures
//! into the [`RemoteError`] taxonomy. Retry and fallback behavior live in
//! the executor, not here.

use crate::config::RemoteConfig;
use crate::error::{classify, RemoteError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Result type alias for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Authenticated user info returned by the auth endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: uuid::Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Client for the hosted backend
#[derive(Debug, Clone)]
pub struct RemoteClient {
    config: RemoteConfig,
    http: Client,
    session_token: Arc<RwLock<Option<String>>>,
}

impl RemoteClient {
    /// Build a client from configuration.
    ///
    /// Fails with [`RemoteError::Configuration`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http,
            session_token: Arc::new(RwLock::new(None)),
        })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Set the user session token (sign-in)
    pub fn set_session_token(&self, token: Option<String>) {
        *self.session_token.write().expect("session token lock poisoned") = token;
    }

    /// Whether a user session token is set
    pub fn has_session(&self) -> bool {
        self.session_token
            .read()
            .expect("session token lock poisoned")
            .is_some()
    }

    fn headers(&self) -> RemoteResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let apikey = HeaderValue::from_str(&self.config.api_key)
            .map_err(|_| RemoteError::configuration("API key contains invalid characters"))?;
        headers.insert("apikey", apikey);
        // Unauthenticated requests carry the anon key as bearer token
        let token = self
            .session_token
            .read()
            .expect("session token lock poisoned")
            .clone()
            .unwrap_or_else(|| self.config.api_key.clone());
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| RemoteError::configuration("session token contains invalid characters"))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Select rows from a table. `query` is the raw query string, e.g.
    /// `select=*&user_id=eq.<id>&order=eaten_at.desc`.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &str) -> RemoteResult<Vec<T>> {
        let url = format!("{}?{}", self.config.rest_url(table), query);
        debug!(%table, "select");
        let response = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let response = Self::check_status(response).await?;
        response.json::<Vec<T>>().await.map_err(RemoteError::from)
    }

    /// Insert a row, returning the stored representation
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
    ) -> RemoteResult<T> {
        let url = self.config.rest_url(table);
        debug!(%table, "insert");
        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let response = Self::check_status(response).await?;
        let mut rows: Vec<T> = response.json().await.map_err(RemoteError::from)?;
        rows.pop()
            .ok_or_else(|| RemoteError::permanent("insert returned no representation"))
    }

    /// Insert-or-update a row keyed on its primary key
    pub async fn upsert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
    ) -> RemoteResult<T> {
        let url = self.config.rest_url(table);
        debug!(%table, "upsert");
        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(body)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let response = Self::check_status(response).await?;
        let mut rows: Vec<T> = response.json().await.map_err(RemoteError::from)?;
        rows.pop()
            .ok_or_else(|| RemoteError::permanent("upsert returned no representation"))
    }

    /// Delete rows matched by the query string
    pub async fn delete(&self, table: &str, query: &str) -> RemoteResult<()> {
        let url = format!("{}?{}", self.config.rest_url(table), query);
        debug!(%table, "delete");
        let response = self
            .http
            .delete(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(RemoteError::from)?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Fetch the current authenticated user, used as the probe's liveness
    /// fallback on deployments that restrict direct table reads
    pub async fn auth_user(&self) -> RemoteResult<AuthUser> {
        let url = self.config.auth_url("user");
        debug!("auth user");
        let response = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let response = Self::check_status(response).await?;
        response.json::<AuthUser>().await.map_err(RemoteError::from)
    }

    /// Lightweight single-row read against a known table, used by the probe
    pub async fn health(&self, table: &str) -> RemoteResult<()> {
        let url = format!("{}?select=id&limit=1", self.config.rest_url(table));
        debug!(%table, "health check");
        let response = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(RemoteError::from)?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Map a non-success HTTP status into the error taxonomy
    async fn check_status(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_else(|_| status.to_string());
        let message = format!("{} - {}", status, body);
        match status {
            StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Err(RemoteError::transient(message)),
            status if status.is_client_error() => Err(RemoteError::permanent(message)),
            // Other 5xx: fall back to the message heuristic
            _ => Err(classify(message)),
        }
    }
}
