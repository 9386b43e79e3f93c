//! Rently Client - HTTP access to the Rently REST API
//!
//! Provides the shared transport (bearer-token attachment, global
//! authorization-failure handling) and typed services for every endpoint
//! group: auth, properties, tenants, rentals and the dashboard.

pub mod services;
pub mod transport;

pub use services::{
    ApiClient, AuthResponse, AuthService, CreateProperty, CreateRental, CreateTenant,
    DashboardService, DashboardStats, LoginRequest, Property, PropertyService, RegisterRequest,
    Rental, RentalService, Tenant, TenantService, UpdateProperty, UpdateTenant,
};
pub use transport::{ApiTransport, NoSession, SessionHandle};
