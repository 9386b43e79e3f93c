//! Rently App - application layer for the property-rental client
//!
//! Wires the persisted session store, the bearer-token transport, the query
//! cache and the route guard together and exposes the screens built on top
//! of them:
//!
//! - **Session** (`session`): persisted authentication state
//! - **Cache** (`cache`): stale-while-revalidate request cache
//! - **Router** (`router`): guarded client-side navigation
//! - **Screens** (`screens`): dashboard, properties, tenants, rentals, auth

pub mod cache;
pub mod router;
pub mod screens;
pub mod session;

pub use cache::{
    CacheStats, MutationSpec, QueryCache, QueryKey, QueryOptions, QueryState,
};
pub use router::{evaluate_guard, DeniedReason, GuardDecision, Route, Router, View};
pub use screens::{
    AuthScreen, DashboardScreen, LoginForm, PropertiesScreen, PropertyForm, RegisterForm,
    RentalForm, RentalsScreen, TenantForm, TenantUpdateForm, TenantsScreen,
};
pub use session::{Session, SessionStore};

use std::path::PathBuf;
use std::sync::Arc;

use rently_client::ApiClient;
use rently_core::{RentlyConfig, RentlyResult};

/// The assembled Rently client application
pub struct RentlyApp {
    config: RentlyConfig,
    session: Arc<SessionStore>,
    client: ApiClient,
    cache: Arc<QueryCache>,
    router: Arc<Router>,
}

/// Builder for [`RentlyApp`]
pub struct RentlyAppBuilder {
    config: RentlyConfig,
}

impl RentlyAppBuilder {
    pub fn new(config: RentlyConfig) -> Self {
        Self { config }
    }

    /// Override where the session cookies are persisted
    pub fn with_cookie_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.session.cookie_file = Some(path.into());
        self
    }

    /// Override the API base URL
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn build(self) -> RentlyResult<RentlyApp> {
        self.config.validate()?;

        let session = Arc::new(SessionStore::new(&self.config.session));
        let client = ApiClient::new(&self.config.api, session.clone())?;
        let cache = Arc::new(QueryCache::new(self.config.cache.clone()));
        let router = Arc::new(Router::new(session.clone()));

        Ok(RentlyApp {
            config: self.config,
            session,
            client,
            cache,
            router,
        })
    }
}

impl RentlyApp {
    pub fn new(config: RentlyConfig) -> RentlyResult<Self> {
        RentlyAppBuilder::new(config).build()
    }

    pub fn builder(config: RentlyConfig) -> RentlyAppBuilder {
        RentlyAppBuilder::new(config)
    }

    /// Restore the persisted session; idempotent
    pub fn initialize(&self) {
        self.session.initialize();
    }

    pub fn config(&self) -> &RentlyConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn auth(&self) -> AuthScreen {
        AuthScreen::new(self.client.clone(), self.session.clone(), self.router.clone())
    }

    pub fn dashboard(&self) -> DashboardScreen {
        DashboardScreen::new(self.client.clone(), self.cache.clone())
    }

    pub fn properties(&self) -> PropertiesScreen {
        PropertiesScreen::new(self.client.clone(), self.cache.clone())
    }

    pub fn tenants(&self) -> TenantsScreen {
        TenantsScreen::new(self.client.clone(), self.cache.clone(), self.session.clone())
    }

    pub fn rentals(&self) -> RentalsScreen {
        RentalsScreen::new(self.client.clone(), self.cache.clone())
    }
}
