//! Client-side routes and the authentication guard
//!
//! The guard is a pure function of session state; the router owns the
//! current location and the redirect-back-after-login bookkeeping.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::session::{Session, SessionStore};

/// Navigable screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Dashboard,
    Properties,
    Tenants,
    Rentals,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Properties => "/properties",
            Route::Tenants => "/tenants",
            Route::Rentals => "/rentals",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        match path {
            "/" => Some(Route::Root),
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/properties" => Some(Route::Properties),
            "/tenants" => Some(Route::Tenants),
            "/rentals" => Some(Route::Rentals),
            _ => None,
        }
    }

    /// Role a route demands, if any
    ///
    /// Role gating is wired through the guard but no built-in screen
    /// currently requires one.
    pub fn required_role(&self) -> Option<&'static str> {
        None
    }
}

/// Why a guarded route was denied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeniedReason {
    NotAuthenticated,
    RoleMismatch { required: String },
}

/// Guard verdict for one route against one session snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session state not known yet; render a loading indicator
    Checking,
    Denied(DeniedReason),
    Allowed,
}

/// Evaluate the guard; driven purely by session state, holds no state of
/// its own
pub fn evaluate_guard(session: &Session, required_role: Option<&str>) -> GuardDecision {
    if session.is_loading {
        return GuardDecision::Checking;
    }

    if !session.is_authenticated {
        return GuardDecision::Denied(DeniedReason::NotAuthenticated);
    }

    if let Some(required) = required_role {
        let satisfied = session
            .user
            .as_ref()
            .map(|user| user.role == required)
            .unwrap_or(false);
        if !satisfied {
            return GuardDecision::Denied(DeniedReason::RoleMismatch {
                required: required.to_string(),
            });
        }
    }

    GuardDecision::Allowed
}

/// What the application should render after a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Session restore still running
    Loading,
    /// Authenticated but the route's role requirement failed; no redirect
    AccessDenied,
    Screen(Route),
}

/// Client-side navigation over the guarded route table
pub struct Router {
    store: Arc<SessionStore>,
    current: RwLock<Route>,
    redirect_after_login: RwLock<Option<Route>>,
}

impl Router {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            current: RwLock::new(Route::Root),
            redirect_after_login: RwLock::new(None),
        }
    }

    /// Navigate to a route, applying the guard
    ///
    /// An unauthenticated hit on a guarded route lands on the login screen
    /// and remembers where the user wanted to go.
    pub fn navigate(&self, route: Route) -> View {
        self.store.initialize();

        // The root route only redirects; the guard then decides between the
        // dashboard and the login screen.
        let route = match route {
            Route::Root => Route::Dashboard,
            other => other,
        };

        if route == Route::Login {
            self.set_current(Route::Login);
            return View::Screen(Route::Login);
        }

        match evaluate_guard(&self.store.snapshot(), route.required_role()) {
            GuardDecision::Checking => View::Loading,
            GuardDecision::Denied(DeniedReason::NotAuthenticated) => {
                debug!("Not authenticated, redirecting {} -> /login", route.path());
                *self
                    .redirect_after_login
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(route);
                self.set_current(Route::Login);
                View::Screen(Route::Login)
            }
            GuardDecision::Denied(DeniedReason::RoleMismatch { required }) => {
                debug!("Access to {} denied, requires role {}", route.path(), required);
                View::AccessDenied
            }
            GuardDecision::Allowed => {
                self.set_current(route);
                View::Screen(route)
            }
        }
    }

    /// Re-render the current location
    ///
    /// After the transport tears a session down, the next render is what
    /// bounces the user to the login screen.
    pub fn render(&self) -> View {
        self.navigate(self.current())
    }

    pub fn current(&self) -> Route {
        *self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Where to go after a successful login: the preserved location, or the
    /// dashboard
    pub fn after_login(&self) -> Route {
        self.redirect_after_login
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or(Route::Dashboard)
    }

    fn set_current(&self, route: Route) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = route;
    }
}
