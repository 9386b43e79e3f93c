//! Screens - thin bindings between the query cache and the REST services
//!
//! Each screen owns its query keys, freshness policy and invalidation set;
//! everything else is delegated to the cache and the API client.

use std::time::Duration;

use crate::cache::{QueryCache, QueryOptions};

pub mod auth;
pub mod dashboard;
pub mod properties;
pub mod rentals;
pub mod tenants;

pub use auth::{AuthScreen, LoginForm, RegisterForm};
pub use dashboard::DashboardScreen;
pub use properties::{PropertiesScreen, PropertyForm};
pub use rentals::{RentalForm, RentalsScreen};
pub use tenants::{TenantForm, TenantUpdateForm, TenantsScreen};

/// Query keys shared between screens and their tests
pub mod keys {
    use crate::cache::QueryKey;

    pub fn properties() -> QueryKey {
        QueryKey::new(["properties"])
    }

    pub fn properties_owner() -> QueryKey {
        QueryKey::new(["properties", "user"])
    }

    pub fn property(id: &str) -> QueryKey {
        QueryKey::new(["properties", id])
    }

    pub fn tenants() -> QueryKey {
        QueryKey::new(["tenants"])
    }

    pub fn rentals() -> QueryKey {
        QueryKey::new(["rentals"])
    }

    pub fn rentals_by_property(property_id: &str) -> QueryKey {
        QueryKey::new(["rentals", "property", property_id])
    }

    pub fn dashboard_stats() -> QueryKey {
        QueryKey::new(["dashboard", "stats"])
    }
}

/// Read options with the shorter per-screen freshness window
pub(crate) fn screen_options(cache: &QueryCache) -> QueryOptions {
    cache
        .default_options()
        .with_stale_after(Duration::from_secs(cache.config().screen_stale_seconds))
}
