//! Application shell: owns the session store and data adapters and resolves
//! a location to the screen that should be shown for it.

use std::sync::Arc;

use crate::backend::{AuthProvider, TableStore};
use crate::data::DataService;
use crate::error::AppError;
use crate::models::{Credentials, NewProgressLog, ProgressLog, Session, User, WorkoutPlan};
use crate::routes::{guard, post_login_route, GuardDecision, Route};
use crate::session::SessionStore;
use crate::supabase::SupabaseClient;
use crate::views::{Fetch, ViewState};

/// What the router decided to show
#[derive(Debug)]
pub enum Screen {
    /// Session still loading
    Placeholder,
    /// Login view; `redirect` is where to go after signing in
    Login { redirect: Option<Route> },
    Dashboard {
        user: User,
        plan: ViewState<WorkoutPlan>,
    },
    Progress {
        history: ViewState<Vec<ProgressLog>>,
    },
    NotFound(String),
}

pub struct App {
    session: SessionStore,
    data: DataService,
}

impl App {
    /// Start the session store against `auth` and serve data from `store`
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn TableStore>) -> Self {
        Self {
            session: SessionStore::start(auth),
            data: DataService::new(store),
        }
    }

    pub fn from_client(client: Arc<SupabaseClient>) -> Self {
        let auth: Arc<dyn AuthProvider> = client.clone();
        let store: Arc<dyn TableStore> = client;
        Self::new(auth, store)
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn data(&self) -> &DataService {
        &self.data
    }

    /// Resolve `location` against the current auth state and load its data
    pub async fn navigate(&self, location: &str) -> Screen {
        let state = self.session.state();

        match guard(location, &state) {
            GuardDecision::Pending => Screen::Placeholder,
            GuardDecision::Redirect { from, .. } => Screen::Login {
                redirect: Some(from),
            },
            GuardDecision::Render(Route::Login) => Screen::Login { redirect: None },
            GuardDecision::Render(Route::NotFound) => Screen::NotFound(location.to_string()),
            GuardDecision::Render(route) => match state.session() {
                Some(session) => self.render_protected(route, session).await,
                None => Screen::Login {
                    redirect: Some(route),
                },
            },
        }
    }

    async fn render_protected(&self, route: Route, session: &Session) -> Screen {
        let user_id = session.user_id();

        match route {
            Route::Progress => {
                let mut history = ViewState::new();
                history
                    .load(async { Fetch::from_list(self.data.fetch_progress_history(user_id).await) })
                    .await;
                Screen::Progress { history }
            }
            _ => {
                let mut plan = ViewState::new();
                plan.load(async { Fetch::from_optional(self.data.fetch_workout_plan(user_id).await) })
                    .await;
                Screen::Dashboard {
                    user: session.user.clone(),
                    plan,
                }
            }
        }
    }

    /// Sign in, wait for the session event, then open the remembered route
    pub async fn login(
        &self,
        credentials: &Credentials,
        redirect: Option<Route>,
    ) -> Result<Screen, AppError> {
        let issued = self.session.authenticate(credentials).await?;
        self.session.mirrored(&issued).await;

        let destination = post_login_route(redirect);
        Ok(self.navigate(destination.path()).await)
    }

    /// Register; when the service signs the user in straight away, continue
    /// like a login
    pub async fn register(
        &self,
        credentials: &Credentials,
        redirect: Option<Route>,
    ) -> Result<Option<Screen>, AppError> {
        match self.session.register(credentials).await? {
            Some(issued) => {
                self.session.mirrored(&issued).await;
                let destination = post_login_route(redirect);
                Ok(Some(self.navigate(destination.path()).await))
            }
            None => Ok(None),
        }
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.end_session().await?;
        self.session.settled(|state| !state.is_authenticated()).await;
        Ok(())
    }

    /// Log an entry for the signed-in user
    pub async fn log_progress(&self, entry: &NewProgressLog) -> Result<ProgressLog, AppError> {
        let user_id = self.session.user_id().ok_or(AppError::NotAuthenticated)?;
        self.data.log_progress(&user_id, entry).await
    }
}
