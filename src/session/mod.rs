//! In-process mirror of the hosted auth state.
//!
//! One synchronizer task owns the `watch` cell holding `AuthState`. It applies
//! the initial session read, then every pushed `AuthEvent` (full replacement,
//! clearing any error) and every action failure reported by the store. The
//! rest of the application only ever holds read-only receivers, so there is a
//! single writer and no locking.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::backend::{AuthEvent, AuthProvider, AuthSubscription};
use crate::error::AppError;
use crate::models::{Credentials, Session, UserId};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// Initial session read still pending
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

/// Snapshot of the mirrored auth state
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub status: SessionStatus,
    /// Last failure of an auth action; cleared by the next auth event
    pub error: Option<AppError>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Loading,
            error: None,
        }
    }
}

impl AuthState {
    fn from_session(session: Option<Session>) -> Self {
        let status = match session {
            Some(session) => SessionStatus::Authenticated(session),
            None => SessionStatus::Unauthenticated,
        };
        Self {
            status,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, SessionStatus::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.status {
            SessionStatus::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.session().map(Session::user_id)
    }
}

/// Session store plus the register / authenticate / end-session actions
pub struct SessionStore {
    auth: Arc<dyn AuthProvider>,
    state: watch::Receiver<AuthState>,
    failures: Option<mpsc::UnboundedSender<AppError>>,
    task: Option<JoinHandle<()>>,
}

impl SessionStore {
    /// Subscribe to auth events and start the initial session read.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(auth: Arc<dyn AuthProvider>) -> Self {
        let (state_tx, state_rx) = watch::channel(AuthState::default());
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        // Subscribe before reading so no event between the two is lost.
        let subscription = auth.on_auth_state_change();
        let task = tokio::spawn(synchronize(
            Arc::clone(&auth),
            subscription,
            failures_rx,
            state_tx,
        ));

        Self {
            auth,
            state: state_rx,
            failures: Some(failures_tx),
            task: Some(task),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Read-only handle for views that want to react to changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state.borrow().user_id().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Wait for the initial session read to finish
    pub async fn ready(&self) -> AuthState {
        self.settled(|state| !state.is_loading()).await
    }

    /// Wait until the mirrored state satisfies `predicate`.
    ///
    /// Returns the last known state if the synchronizer has stopped.
    pub async fn settled<F>(&self, mut predicate: F) -> AuthState
    where
        F: FnMut(&AuthState) -> bool,
    {
        let mut receiver = self.state.clone();
        if let Ok(state) = receiver.wait_for(|state| predicate(state)).await {
            return state.clone();
        }
        self.state.borrow().clone()
    }

    /// Wait until the mirrored state holds `session`.
    ///
    /// A session that was already mirrored before signing in satisfies
    /// `is_authenticated` immediately, so callers that just issued a new
    /// session wait for its access token instead.
    pub async fn mirrored(&self, session: &Session) -> AuthState {
        self.settled(|state| {
            state
                .session()
                .is_some_and(|current| current.access_token == session.access_token)
        })
        .await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<Option<Session>, AppError> {
        let result = match validate_credentials(credentials) {
            Ok(()) => self.auth.sign_up(credentials).await.map_err(AppError::from),
            Err(e) => Err(e),
        };
        self.report(result)
    }

    /// Sign in and return the issued session. The mirrored state only picks
    /// it up once the matching event arrives; see `mirrored`.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let result = match validate_credentials(credentials) {
            Ok(()) => self
                .auth
                .sign_in_with_password(credentials)
                .await
                .map_err(AppError::from),
            Err(e) => Err(e),
        };
        self.report(result)
    }

    pub async fn end_session(&self) -> Result<(), AppError> {
        let result = self.auth.sign_out().await.map_err(AppError::from);
        self.report(result)
    }

    /// Stop the synchronizer and unsubscribe from auth events
    pub async fn shutdown(mut self) {
        self.failures.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Session synchronizer ended abnormally: {}", e);
            }
        }
    }

    // Failures go to the synchronizer, which stays the only writer of state.
    fn report<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(e) = &result {
            tracing::warn!("Auth action failed: {}", e);
            if let Some(failures) = &self.failures {
                if failures.send(e.clone()).is_err() {
                    tracing::debug!("Session synchronizer already stopped");
                }
            }
        }
        result
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn validate_credentials(credentials: &Credentials) -> Result<(), AppError> {
    if credentials.email.trim().is_empty() {
        return Err(AppError::validation("email is required"));
    }
    if credentials.password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    Ok(())
}

async fn synchronize(
    auth: Arc<dyn AuthProvider>,
    mut subscription: AuthSubscription,
    mut failures: mpsc::UnboundedReceiver<AppError>,
    state: watch::Sender<AuthState>,
) {
    let initial = auth.get_session().await;
    drop(auth);

    if state.is_closed() {
        subscription.unsubscribe();
        return;
    }

    let initial_state = match initial {
        Ok(session) => AuthState::from_session(session),
        Err(e) => AuthState {
            status: SessionStatus::Unauthenticated,
            error: Some(AppError::from(e)),
        },
    };
    state.send_replace(initial_state);

    loop {
        tokio::select! {
            event = subscription.next() => match event {
                Some(event) => apply_event(&state, event),
                None => break,
            },
            failure = failures.recv() => match failure {
                Some(error) => {
                    state.send_modify(|current| current.error = Some(error));
                }
                None => break,
            },
        }

        if state.is_closed() {
            break;
        }
    }

    subscription.unsubscribe();
    tracing::debug!("Session synchronizer stopped");
}

fn apply_event(state: &watch::Sender<AuthState>, event: AuthEvent) {
    tracing::debug!(event = event.name(), "Applying auth event");
    state.send_replace(AuthState::from_session(event.session().cloned()));
}
