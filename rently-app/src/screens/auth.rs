//! Login, registration and logout flows

use std::sync::Arc;

use tracing::{debug, info};

use rently_client::{ApiClient, LoginRequest, RegisterRequest};
use rently_core::{validation_error, RentlyResult};

use crate::router::{Route, Router};
use crate::session::SessionStore;

/// Login form input, validated before it reaches the network
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> RentlyResult<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(validation_error!(
                "A valid email address is required",
                "email",
                "auth_screen"
            ));
        }
        if self.password.len() < 6 {
            return Err(validation_error!(
                "Password must be at least 6 characters",
                "password",
                "auth_screen"
            ));
        }
        Ok(())
    }
}

/// Registration form input
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> RentlyResult<()> {
        if self.name.trim().is_empty() {
            return Err(validation_error!("Name is required", "name", "auth_screen"));
        }
        LoginForm {
            email: self.email.clone(),
            password: self.password.clone(),
        }
        .validate()
    }
}

/// Authentication flows binding the auth service to the session store
pub struct AuthScreen {
    client: ApiClient,
    session: Arc<SessionStore>,
    router: Arc<Router>,
}

impl AuthScreen {
    pub(crate) fn new(client: ApiClient, session: Arc<SessionStore>, router: Arc<Router>) -> Self {
        Self {
            client,
            session,
            router,
        }
    }

    /// Exchange credentials for a session; returns where to navigate next
    pub async fn login(&self, form: LoginForm) -> RentlyResult<Route> {
        form.validate()?;

        let response = self
            .client
            .auth()
            .login(&LoginRequest {
                email: form.email,
                password: form.password,
            })
            .await?;

        let (user, token) = response.into_parts();
        self.session.login(user, token);

        Ok(self.router.after_login())
    }

    /// Create an account and start a session with the returned credentials
    pub async fn register(&self, form: RegisterForm) -> RentlyResult<Route> {
        form.validate()?;

        let response = self
            .client
            .auth()
            .register(&RegisterRequest {
                name: form.name,
                email: form.email,
                password: form.password,
            })
            .await?;

        let (user, token) = response.into_parts();
        self.session.login(user, token);

        Ok(self.router.after_login())
    }

    /// End the session; the server call is best-effort, local teardown is not
    pub async fn logout(&self) -> Route {
        if let Err(e) = self.client.auth().logout().await {
            debug!("Server-side logout failed, continuing locally: {}", e);
        }
        self.session.logout();
        info!("Logged out");
        Route::Login
    }
}
