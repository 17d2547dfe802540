//! HTTP client for a Supabase project: GoTrue under `/auth/v1` and
//! PostgREST under `/rest/v1`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::backend::{AuthProvider, AuthSubscription, Query, TableStore};
use crate::config::Config;
use crate::models::{Credentials, Session};
use crate::storage::SessionStorage;

mod auth;
mod error;
mod rest;

pub use auth::AuthClient;
pub use error::ApiError;
pub use rest::query_pairs;

/// API client for the hosted backend
pub struct SupabaseClient {
    http: Client,
    rest_url: String,
    anon_key: String,
    auth: AuthClient,
}

impl SupabaseClient {
    /// Create a client that persists its session at `config.session_path`
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let storage = SessionStorage::new(config.session_path.clone());
        Self::with_storage(config, Some(storage))
    }

    /// Create a client with explicit session persistence (`None` keeps the
    /// session in memory only)
    pub fn with_storage(config: &Config, storage: Option<SessionStorage>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fitlog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Unknown(format!("Failed to create HTTP client: {}", e)))?;

        let auth = AuthClient::new(
            http.clone(),
            config.auth_url(),
            config.anon_key.clone(),
            storage,
        );

        Ok(Self {
            http,
            rest_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
            auth,
        })
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, ApiError> {
        self.auth.sign_up(credentials).await
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.auth.sign_in_with_password(credentials).await
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.auth.sign_out().await
    }

    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        self.auth.get_session().await
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.auth.subscribe()
    }
}

#[async_trait]
impl TableStore for SupabaseClient {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        self.select_rows(query).await
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, ApiError> {
        self.insert_rows(table, rows).await
    }
}

/// Decode a successful JSON body, or turn the error body into an `ApiError`
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ApiError::from_body(status, &error_text))
    }
}
