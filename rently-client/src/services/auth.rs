//! Authentication endpoints

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rently_core::{RentlyResult, User};

use crate::transport::ApiTransport;

/// Credentials for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Server-issued identity and bearer token
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

impl AuthResponse {
    /// Split into the user record and the opaque token
    pub fn into_parts(self) -> (User, String) {
        (
            User {
                id: self.id,
                name: self.name,
                email: self.email,
                role: self.role,
            },
            self.token,
        )
    }
}

/// Client for the authentication endpoints
pub struct AuthService {
    transport: Arc<ApiTransport>,
}

impl AuthService {
    pub(crate) fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a server-issued session
    pub async fn login(&self, request: &LoginRequest) -> RentlyResult<AuthResponse> {
        let response: AuthResponse = self.transport.post("/auth/login", request).await?;
        info!("Logged in as {} ({})", response.name, response.email);
        Ok(response)
    }

    /// Create a new owner account
    pub async fn register(&self, request: &RegisterRequest) -> RentlyResult<AuthResponse> {
        let response: AuthResponse = self.transport.post("/auth/register", request).await?;
        info!("Registered account for {}", response.email);
        Ok(response)
    }

    /// Server-side session teardown, best-effort
    pub async fn logout(&self) -> RentlyResult<()> {
        debug!("Requesting server-side logout");
        self.transport.post_empty("/auth/logout").await
    }
}
