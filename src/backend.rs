//! Seams between the application and the hosted backend.
//!
//! `AuthProvider` and `TableStore` are the only operations the rest of the
//! crate consumes. `SupabaseClient` implements both over HTTP; tests swap in
//! in-memory doubles.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::models::{Credentials, Session};
use crate::supabase::ApiError;

/// Change pushed by the auth client whenever its session changes
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
    UserUpdated(Session),
}

impl AuthEvent {
    /// Session carried by the event; `None` means signed out
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session)
            | AuthEvent::TokenRefreshed(session)
            | AuthEvent::UserUpdated(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn(_) => "SIGNED_IN",
            AuthEvent::SignedOut => "SIGNED_OUT",
            AuthEvent::TokenRefreshed(_) => "TOKEN_REFRESHED",
            AuthEvent::UserUpdated(_) => "USER_UPDATED",
        }
    }
}

/// Handle returned by `AuthProvider::on_auth_state_change`.
///
/// Dropping the handle or calling `unsubscribe` detaches it from the event
/// channel; afterwards `next` always yields `None`.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: Option<broadcast::Receiver<AuthEvent>>,
}

impl AuthSubscription {
    pub fn new(receiver: broadcast::Receiver<AuthEvent>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Wait for the next event. `None` once unsubscribed or the sender is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Auth subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        if self.receiver.take().is_some() {
            tracing::debug!("Unsubscribed from auth events");
        }
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Hosted identity service.
///
/// Every successful state-changing call must publish the matching
/// `AuthEvent` to all subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account. `None` when the service requires e-mail
    /// confirmation before issuing a session.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, ApiError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    async fn sign_out(&self) -> Result<(), ApiError>;

    /// Current session, refreshed first if it has expired
    async fn get_session(&self) -> Result<Option<Session>, ApiError>;

    fn on_auth_state_change(&self) -> AuthSubscription;
}

/// Equality-filtered, ordered read over one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Query {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hosted row storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ApiError>;

    /// Insert rows and return them as stored
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserId};

    fn session() -> Session {
        Session {
            access_token: "a".to_string(),
            token_type: "bearer".to_string(),
            expires_in: None,
            expires_at: None,
            refresh_token: "r".to_string(),
            user: User {
                id: UserId::new("u1"),
                email: None,
            },
        }
    }

    #[test]
    fn test_query_builder() {
        let query = Query::from("progress_logs")
            .eq("user_id", "u1")
            .order("workout_date", false)
            .limit(2);

        assert_eq!(query.table, "progress_logs");
        assert_eq!(query.filters[0].value, "u1");
        assert!(!query.order[0].ascending);
        assert_eq!(query.limit, Some(2));
    }

    #[tokio::test]
    async fn test_subscription_receives_and_unsubscribes() {
        let (tx, rx) = broadcast::channel(4);
        let mut subscription = AuthSubscription::new(rx);

        tx.send(AuthEvent::SignedIn(session())).unwrap();
        let event = subscription.next().await.unwrap();
        assert_eq!(event.name(), "SIGNED_IN");
        assert_eq!(event.session().unwrap().user_id().as_str(), "u1");

        subscription.unsubscribe();
        assert!(!subscription.is_active());
        assert_eq!(tx.receiver_count(), 0);
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_subscription_ends_when_sender_dropped() {
        let (tx, rx) = broadcast::channel::<AuthEvent>(4);
        let mut subscription = AuthSubscription::new(rx);
        drop(tx);
        assert!(subscription.next().await.is_none());
        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_latest_events() {
        let (tx, rx) = broadcast::channel(1);
        let mut subscription = AuthSubscription::new(rx);

        tx.send(AuthEvent::SignedIn(session())).unwrap();
        tx.send(AuthEvent::SignedOut).unwrap();

        assert_eq!(subscription.next().await, Some(AuthEvent::SignedOut));
    }
}
