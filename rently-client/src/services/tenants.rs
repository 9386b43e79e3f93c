//! Tenant endpoints
//!
//! Tenants are user accounts scoped to the current owner; the API exposes
//! them through user-flavored paths rather than a `/tenants` resource.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rently_core::RentlyResult;

use crate::transport::ApiTransport;

/// A tenant account belonging to the current owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub is_active: bool,
}

/// Payload for `POST /create-tenant-user`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenant {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub owner_id: String,
}

/// Payload for `PATCH /users/:id`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenant {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

/// Client for the tenant endpoints
pub struct TenantService {
    transport: Arc<ApiTransport>,
}

impl TenantService {
    pub(crate) fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// List tenants belonging to the current owner
    pub async fn list_owner(&self) -> RentlyResult<Vec<Tenant>> {
        self.transport.get("/users-owner").await
    }

    pub async fn create(&self, request: &CreateTenant) -> RentlyResult<Tenant> {
        self.transport.post("/create-tenant-user", request).await
    }

    pub async fn update(&self, id: &str, request: &UpdateTenant) -> RentlyResult<Tenant> {
        self.transport.patch(&format!("/users/{}", id), request).await
    }
}
