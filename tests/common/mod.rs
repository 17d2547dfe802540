#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value};
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};
use uuid::Uuid;

use fitlog::backend::{AuthEvent, AuthProvider, AuthSubscription, Query, TableStore};
use fitlog::models::{Credentials, Session, User, UserId};
use fitlog::supabase::ApiError;

pub fn session_for(user: &User) -> Session {
    Session {
        access_token: format!("access-{}", user.id),
        token_type: "bearer".to_string(),
        expires_in: Some(3600),
        expires_at: None,
        refresh_token: format!("refresh-{}", user.id),
        user: user.clone(),
    }
    .with_issued_at(Utc::now())
}

/// In-memory identity service that publishes events like the hosted one
pub struct FakeAuth {
    accounts: Mutex<HashMap<String, (String, User)>>,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
    require_confirmation: AtomicBool,
    hold_initial_read: AtomicBool,
    release: Notify,
    pub sign_in_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
}

impl FakeAuth {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events,
            require_confirmation: AtomicBool::new(false),
            hold_initial_read: AtomicBool::new(false),
            release: Notify::new(),
            sign_in_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
        })
    }

    /// Add an account and return its user
    pub fn with_account(&self, email: &str, password: &str) -> User {
        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            email: Some(email.to_string()),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    /// Pretend a session was persisted by an earlier run
    pub fn restore(&self, user: &User) {
        *self.session.lock().unwrap() = Some(session_for(user));
    }

    pub fn require_confirmation(&self) {
        self.require_confirmation.store(true, Ordering::SeqCst);
    }

    /// Block `get_session` until `release_initial_read` is called
    pub fn hold_initial_read(&self) {
        self.hold_initial_read.store(true, Ordering::SeqCst);
    }

    pub fn release_initial_read(&self) {
        self.release.notify_one();
    }

    /// Publish an event as if another client changed the session
    pub fn emit(&self, event: AuthEvent) {
        *self.session.lock().unwrap() = event.session().cloned();
        let _ = self.events.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, ApiError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        if self.accounts.lock().unwrap().contains_key(&credentials.email) {
            return Err(ApiError::BadRequest("User already registered".to_string()));
        }
        let user = self.with_account(&credentials.email, &credentials.password);

        if self.require_confirmation.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let session = session_for(&user);
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(Some(session))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let user = match self.accounts.lock().unwrap().get(&credentials.email) {
            Some((password, user)) if *password == credentials.password => user.clone(),
            _ => {
                return Err(ApiError::AuthenticationFailed(
                    "Invalid login credentials".to_string(),
                ))
            }
        };
        let session = session_for(&user);
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        if self.hold_initial_read.swap(false, Ordering::SeqCst) {
            self.release.notified().await;
        }
        Ok(self.current_session())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }
}

/// In-memory row store honouring equality filters, ordering and limits
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicI64,
    clock: Mutex<DateTime<Utc>>,
    fail_next: Mutex<Option<ApiError>>,
    ignore_order: AtomicBool,
    pub select_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub last_query: Mutex<Option<Query>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tables: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            clock: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()),
            fail_next: Mutex::new(None),
            ignore_order: AtomicBool::new(false),
            select_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    /// Return rows in storage order, leaving ordering to the caller
    pub fn ignore_order(&self) {
        self.ignore_order.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst) + self.insert_calls.load(Ordering::SeqCst)
    }

    fn tick(&self) -> String {
        let mut clock = self.clock.lock().unwrap();
        *clock = *clock + Duration::seconds(1);
        clock.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }

        let mut rows: Vec<Value> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|f| column_text(row, &f.column).as_deref() == Some(f.value.as_str()))
            })
            .collect();

        if !self.ignore_order.load(Ordering::SeqCst) {
            rows.sort_by(|a, b| {
                query.order.iter().fold(CmpOrdering::Equal, |acc, order| {
                    acc.then_with(|| {
                        let ord = column_text(a, &order.column).cmp(&column_text(b, &order.column));
                        if order.ascending {
                            ord
                        } else {
                            ord.reverse()
                        }
                    })
                })
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, ApiError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }

        let stored: Vec<Value> = rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if let Value::Object(fields) = &mut row {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    fields.insert("id".to_string(), json!(id));
                    fields
                        .entry("created_at".to_string())
                        .or_insert_with(|| json!(self.tick()));
                }
                row
            })
            .collect();

        self.seed(table, stored.clone());
        Ok(stored)
    }
}

pub fn plan_row(user_id: &UserId) -> Value {
    json!({
        "id": 1,
        "user_id": user_id.as_str(),
        "name": "Strength Block",
        "description": "Three days a week",
        "exercises": [
            {"name": "Squat", "sets": 5, "reps": "5"},
            {"name": "Bench Press", "sets": 5, "reps": "5"},
            {"name": "Deadlift", "sets": 1, "reps": "5"}
        ]
    })
}

pub fn log_row(id: i64, user_id: &UserId, date: &str, created_at: &str, exercise: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id.as_str(),
        "created_at": created_at,
        "workout_name": "Leg Day",
        "exercise_name": exercise,
        "sets_completed": 3,
        "reps_achieved": "8,8,7",
        "weight_used": null,
        "workout_date": date
    })
}
