//! Navigable views and the guard that gates the protected ones.

use std::fmt;

use crate::session::{AuthState, SessionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Progress,
    NotFound,
}

impl Route {
    /// Resolve a location such as `/progress?tab=history` to a route
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let path = path.trim_end_matches('/');

        match path {
            "" | "/dashboard" => Route::Dashboard,
            "/login" => Route::Login,
            "/progress" => Route::Progress,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Progress => "/progress",
            Route::NotFound => "/404",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Progress)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of asking the guard whether a location may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading: show a placeholder, decide nothing yet
    Pending,
    Render(Route),
    /// Send the user to `to`, remembering where they wanted to go
    Redirect { to: Route, from: Route },
}

/// Decide what to show for `location` given the mirrored auth state.
///
/// Expiry is not checked here; an expired session only disappears once the
/// auth service reports it.
pub fn guard(location: &str, state: &AuthState) -> GuardDecision {
    let route = Route::parse(location);

    if !route.is_protected() {
        return GuardDecision::Render(route);
    }

    match state.status {
        SessionStatus::Loading => GuardDecision::Pending,
        SessionStatus::Authenticated(_) => GuardDecision::Render(route),
        SessionStatus::Unauthenticated => {
            tracing::debug!(requested = %route, "Redirecting to login");
            GuardDecision::Redirect {
                to: Route::Login,
                from: route,
            }
        }
    }
}

/// Where the login view sends the user after a successful sign-in
pub fn post_login_route(from: Option<Route>) -> Route {
    match from {
        Some(route) if route.is_protected() => route,
        _ => Route::Dashboard,
    }
}
