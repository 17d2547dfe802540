use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use tokio::sync::{broadcast, RwLock};

use super::{read_json, ApiError};
use crate::backend::{AuthEvent, AuthSubscription};
use crate::models::{Credentials, Session, User};
use crate::storage::SessionStorage;

const EVENT_CAPACITY: usize = 16;

/// GoTrue client that owns the current session and publishes its changes.
///
/// Successful sign-in, refresh and sign-out each emit exactly one
/// `AuthEvent` to every live subscription.
pub struct AuthClient {
    http: Client,
    auth_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
    storage: Option<SessionStorage>,
}

impl AuthClient {
    pub(crate) fn new(
        http: Client,
        auth_url: String,
        anon_key: String,
        storage: Option<SessionStorage>,
    ) -> Self {
        let persisted = storage.as_ref().and_then(|storage| match storage.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file: {:#}", e);
                None
            }
        });
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            http,
            auth_url,
            anon_key,
            session: RwLock::new(persisted),
            events,
            storage,
        }
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(self.anon_key.as_str()))
    }

    /// Register a new account.
    ///
    /// Projects with e-mail confirmation enabled answer with the bare user and
    /// no session; that case returns `Ok(None)` and emits nothing.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, ApiError> {
        tracing::debug!("Registering {}", credentials.email);

        let response = self
            .request(Method::POST, "signup", None)
            .json(credentials)
            .send()
            .await?;
        let body: Value = read_json(response).await?;

        if body.get("access_token").is_none() {
            tracing::info!("Registration for {} awaits e-mail confirmation", credentials.email);
            return Ok(None);
        }

        let session: Session = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let session = session.with_issued_at(Utc::now());
        self.store_session(&session, AuthEvent::SignedIn(session.clone()))
            .await;

        Ok(Some(session))
    }

    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        tracing::debug!("Logging in as {}", credentials.email);

        let response = self
            .request(Method::POST, "token", None)
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await?;

        let session = match read_json::<Session>(response).await {
            Ok(session) => session.with_issued_at(Utc::now()),
            Err(ApiError::BadRequest(msg)) => return Err(ApiError::AuthenticationFailed(msg)),
            Err(e) => return Err(e),
        };

        self.store_session(&session, AuthEvent::SignedIn(session.clone()))
            .await;
        tracing::info!("Successfully logged in as {}", credentials.email);
        Ok(session)
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        tracing::debug!("Refreshing access token");

        let response = self
            .request(Method::POST, "token", None)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let session = match read_json::<Session>(response).await {
            Ok(session) => session.with_issued_at(Utc::now()),
            Err(ApiError::BadRequest(msg)) => return Err(ApiError::AuthenticationFailed(msg)),
            Err(e) => return Err(e),
        };

        self.store_session(&session, AuthEvent::TokenRefreshed(session.clone()))
            .await;
        tracing::info!("Successfully refreshed access token");
        Ok(session)
    }

    /// Revoke the current session.
    ///
    /// A token the server no longer recognises still counts as signed out;
    /// any other failure leaves the local session untouched.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let current = self.session.read().await.clone();

        if let Some(session) = current {
            let response = self
                .request(Method::POST, "logout", Some(&session.access_token))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                let err = ApiError::from_body(status, &error_text);
                if !(err.is_auth_rejection() || matches!(err, ApiError::NotFound(_))) {
                    return Err(err);
                }
                tracing::debug!("Logout rejected stale token, clearing locally: {}", err);
            }
        }

        self.clear_session().await;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Current session, refreshed first if it has expired.
    ///
    /// A refresh token the server rejects ends the session (`Ok(None)` plus a
    /// `SignedOut` event); transport failures are returned as errors.
    pub async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        let current = self.session.read().await.clone();

        match current {
            Some(session) if session.is_expired() => {
                match self.refresh_session(&session.refresh_token).await {
                    Ok(session) => Ok(Some(session)),
                    Err(e) if e.is_auth_rejection() => {
                        tracing::warn!("Session refresh rejected: {}", e);
                        self.clear_session().await;
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
            other => Ok(other),
        }
    }

    /// Fetch the user behind the current access token from the server
    pub async fn get_user(&self) -> Result<User, ApiError> {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => return Err(ApiError::Unauthorized("No active session".to_string())),
        };

        tracing::debug!("Fetching current user information");

        let response = self.request(Method::GET, "user", Some(&token)).send().await?;
        read_json(response).await
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Bearer token for row requests: the user's when signed in, else the anon key
    pub(crate) async fn access_token(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn store_session(&self, session: &Session, event: AuthEvent) {
        *self.session.write().await = Some(session.clone());

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save(session) {
                tracing::warn!("Failed to persist session: {:#}", e);
            }
        }

        self.emit(event);
    }

    async fn clear_session(&self) {
        *self.session.write().await = None;

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.clear() {
                tracing::warn!("Failed to remove persisted session: {:#}", e);
            }
        }

        self.emit(AuthEvent::SignedOut);
    }

    fn emit(&self, event: AuthEvent) {
        tracing::info!(event = event.name(), "Auth state changed");
        if self.events.send(event).is_err() {
            tracing::debug!("No auth subscribers");
        }
    }
}
