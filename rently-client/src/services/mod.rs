//! Typed services over the Rently REST API
//!
//! One service per resource; request and response shapes live beside the
//! service that uses them, named the way the wire names them.

use std::sync::Arc;

use rently_core::{ApiConfig, RentlyResult};

use crate::transport::{ApiTransport, SessionHandle};

pub mod auth;
pub mod dashboard;
pub mod properties;
pub mod rentals;
pub mod tenants;


pub use auth::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
pub use dashboard::{DashboardService, DashboardStats};
pub use properties::{CreateProperty, Property, PropertyService, UpdateProperty};
pub use rentals::{CreateRental, Rental, RentalService};
pub use tenants::{CreateTenant, Tenant, TenantService, UpdateTenant};

/// Facade bundling every endpoint service behind one shared transport
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<ApiTransport>,
}

impl ApiClient {
    /// Create a client with a fresh transport
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionHandle>) -> RentlyResult<Self> {
        Ok(Self {
            transport: Arc::new(ApiTransport::new(config, session)?),
        })
    }

    /// Create a client around an existing transport
    pub fn from_transport(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<ApiTransport> {
        &self.transport
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.transport.clone())
    }

    pub fn properties(&self) -> PropertyService {
        PropertyService::new(self.transport.clone())
    }

    pub fn tenants(&self) -> TenantService {
        TenantService::new(self.transport.clone())
    }

    pub fn rentals(&self) -> RentalService {
        RentalService::new(self.transport.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.transport.clone())
    }
}
