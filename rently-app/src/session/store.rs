//! Session store - single source of truth for authentication state
//!
//! Holds the current user and bearer token, persists them through the cookie
//! jar so a restart does not force re-login, and exposes a small, enumerable
//! operation set. All reads go through accessors; no operation here fails.

use std::sync::{PoisonError, RwLock};

use chrono::Duration;
use tracing::{debug, info, warn};

use rently_client::SessionHandle;
use rently_core::{SessionConfig, User};

use super::persistence::{
    CookieJar, COOKIE_TOKEN, COOKIE_USER_EMAIL, COOKIE_USER_ID, COOKIE_USER_NAME,
    COOKIE_USER_ROLE, SESSION_COOKIES,
};

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub is_initialized: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    token: Option<String>,
    is_authenticated: bool,
    is_loading: bool,
    is_initialized: bool,
}

/// Shared authentication state, persisted across restarts
pub struct SessionStore {
    jar: CookieJar,
    expiry: Duration,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let path = config
            .cookie_file
            .clone()
            .unwrap_or_else(CookieJar::default_path);

        Self {
            jar: CookieJar::open(path),
            expiry: Duration::days(config.expiry_days),
            state: RwLock::new(SessionState {
                is_loading: true,
                ..Default::default()
            }),
        }
    }

    /// Restore a session from the cookie jar
    ///
    /// Idempotent: runs at most once per process lifetime. A partial cookie
    /// set is treated as no session at all and wiped, never surfaced as an
    /// error.
    pub fn initialize(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_initialized {
            return;
        }

        let token = self.jar.get(COOKIE_TOKEN);
        let user_id = self.jar.get(COOKIE_USER_ID);
        let user_name = self.jar.get(COOKIE_USER_NAME);
        let user_email = self.jar.get(COOKIE_USER_EMAIL);
        let user_role = self.jar.get(COOKIE_USER_ROLE);

        match (token, user_id, user_name, user_email) {
            (Some(token), Some(id), Some(name), Some(email))
                if !token.is_empty() && !id.is_empty() =>
            {
                let user = User {
                    id,
                    name,
                    email,
                    role: user_role
                        .filter(|role| !role.is_empty())
                        .unwrap_or_else(|| "user".to_string()),
                };
                debug!("Restored session for {}", user.email);
                state.user = Some(user);
                state.token = Some(token);
                state.is_authenticated = true;
            }
            _ => {
                // Partially-valid state is worse than none; wipe everything.
                debug!("No restorable session, clearing persisted fields");
                self.jar.remove_many(&SESSION_COOKIES);
                state.user = None;
                state.token = None;
                state.is_authenticated = false;
            }
        }

        state.is_loading = false;
        state.is_initialized = true;
    }

    /// Persist fresh server-issued credentials and mark the session live
    ///
    /// Overwrites any prior session. Cookies are written before the in-memory
    /// state flips.
    pub fn login(&self, user: User, token: String) {
        self.jar.set_many(
            &[
                (COOKIE_TOKEN, token.as_str()),
                (COOKIE_USER_ID, user.id.as_str()),
                (COOKIE_USER_ROLE, user.role.as_str()),
                (COOKIE_USER_NAME, user.name.as_str()),
                (COOKIE_USER_EMAIL, user.email.as_str()),
            ],
            self.expiry,
        );

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        info!("Session started for {}", user.email);
        state.user = Some(user);
        state.token = Some(token);
        state.is_authenticated = true;
        state.is_loading = false;
    }

    /// Clear the session, persisted fields included. Idempotent.
    pub fn logout(&self) {
        self.jar.remove_many(&SESSION_COOKIES);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_authenticated {
            info!("Session ended");
        }
        state.user = None;
        state.token = None;
        state.is_authenticated = false;
        state.is_loading = false;
    }

    /// Flip the loading flag without touching identity
    pub fn set_loading(&self, loading: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.is_loading = loading;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_loading
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_initialized
    }

    pub fn user(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn snapshot(&self) -> Session {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Session {
            user: state.user.clone(),
            token: state.token.clone(),
            is_authenticated: state.is_authenticated,
            is_loading: state.is_loading,
            is_initialized: state.is_initialized,
        }
    }
}

impl SessionHandle for SessionStore {
    fn token(&self) -> Option<String> {
        SessionStore::token(self)
    }

    fn force_logout(&self) {
        warn!("Transport requested session teardown");
        self.logout();
    }
}