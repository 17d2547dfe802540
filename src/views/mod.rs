//! View state and terminal rendering for each route.

pub mod dashboard;
pub mod progress;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::app::Screen;
use crate::error::AppError;

/// Data held by a view.
///
/// `NotFetched` and `Empty` are deliberately distinct: the first means no
/// request has completed yet, the second that the backend had nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    NotFetched,
    Empty,
    Loaded(T),
    Failed(AppError),
}

impl<T> Default for Fetch<T> {
    fn default() -> Self {
        Fetch::NotFetched
    }
}

impl<T> Fetch<T> {
    /// From an adapter result where `None` means "nothing stored"
    pub fn from_optional(result: Result<Option<T>, AppError>) -> Self {
        match result {
            Ok(Some(data)) => Fetch::Loaded(data),
            Ok(None) => Fetch::Empty,
            Err(e) => Fetch::Failed(e),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            Fetch::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_fetched(&self) -> bool {
        !matches!(self, Fetch::NotFetched)
    }
}

impl<T> Fetch<Vec<T>> {
    /// From an adapter result where an empty list means "nothing stored"
    pub fn from_list(result: Result<Vec<T>, AppError>) -> Self {
        match result {
            Ok(items) if items.is_empty() => Fetch::Empty,
            Ok(items) => Fetch::Loaded(items),
            Err(e) => Fetch::Failed(e),
        }
    }
}

/// Cloneable handle used to tear a view down while a load is in flight
#[derive(Debug, Clone)]
pub struct MountHandle {
    mounted: Arc<AtomicBool>,
}

impl MountHandle {
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}

/// Per-view loading flag and data.
///
/// In-flight requests are never cancelled; a result that arrives after the
/// view was unmounted is dropped instead of applied.
#[derive(Debug)]
pub struct ViewState<T> {
    pub loading: bool,
    pub data: Fetch<T>,
    mounted: Arc<AtomicBool>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self {
            loading: false,
            data: Fetch::NotFetched,
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn handle(&self) -> MountHandle {
        MountHandle {
            mounted: Arc::clone(&self.mounted),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Run `request` and apply its result if the view is still mounted.
    ///
    /// Returns whether the result was applied.
    pub async fn load<F>(&mut self, request: F) -> bool
    where
        F: Future<Output = Fetch<T>>,
    {
        self.loading = true;
        let result = request.await;

        if !self.is_mounted() {
            tracing::debug!("Discarding result for unmounted view");
            return false;
        }

        self.loading = false;
        self.data = result;
        true
    }
}

/// Render whatever screen the router settled on
pub fn render(screen: &Screen) -> String {
    match screen {
        Screen::Placeholder => "Loading...\n".to_string(),
        Screen::Login { redirect } => {
            let mut out = String::from("Login required.\n");
            match redirect {
                Some(route) => out.push_str(&format!(
                    "Use 'fitlog login --redirect {}' to sign in and continue.\n",
                    route.path()
                )),
                None => out.push_str("Use 'fitlog login' to sign in.\n"),
            }
            out
        }
        Screen::Dashboard { user, plan } => dashboard::render(Some(user), &plan.data),
        Screen::Progress { history } => progress::render_history(&history.data),
        Screen::NotFound(location) => format!("Page not found: {}\n", location),
    }
}
