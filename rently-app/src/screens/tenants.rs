//! Tenants screen

use std::sync::Arc;

use rently_client::{ApiClient, CreateTenant, Tenant, UpdateTenant};
use rently_core::{validation_error, ErrorContext, RentlyError, RentlyResult};

use crate::cache::{encode, MutationSpec, QueryCache};
use crate::session::SessionStore;

use super::{keys, screen_options};

/// New-tenant form input
#[derive(Debug, Clone)]
pub struct TenantForm {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

impl TenantForm {
    pub fn validate(&self) -> RentlyResult<()> {
        if self.name.trim().is_empty() {
            return Err(validation_error!("Name is required", "name", "tenants_screen"));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(validation_error!(
                "A valid email address is required",
                "email",
                "tenants_screen"
            ));
        }
        if self.phone_number.trim().is_empty() {
            return Err(validation_error!(
                "Phone number is required",
                "phoneNumber",
                "tenants_screen"
            ));
        }
        if self.password.len() < 6 {
            return Err(validation_error!(
                "Password must be at least 6 characters",
                "password",
                "tenants_screen"
            ));
        }
        Ok(())
    }
}

/// Tenant update form input; tenants change their own passwords
#[derive(Debug, Clone)]
pub struct TenantUpdateForm {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

impl TenantUpdateForm {
    pub fn validate(&self) -> RentlyResult<()> {
        if self.name.trim().is_empty() {
            return Err(validation_error!("Name is required", "name", "tenants_screen"));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(validation_error!(
                "A valid email address is required",
                "email",
                "tenants_screen"
            ));
        }
        if self.phone_number.trim().is_empty() {
            return Err(validation_error!(
                "Phone number is required",
                "phoneNumber",
                "tenants_screen"
            ));
        }
        Ok(())
    }
}

/// Tenant listing and management bound to the cache
pub struct TenantsScreen {
    client: ApiClient,
    cache: Arc<QueryCache>,
    session: Arc<SessionStore>,
}

impl TenantsScreen {
    pub(crate) fn new(
        client: ApiClient,
        cache: Arc<QueryCache>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            client,
            cache,
            session,
        }
    }

    /// Tenants of the current owner, served through the cache
    pub async fn list(&self) -> RentlyResult<Vec<Tenant>> {
        let client = self.client.clone();
        let state = self
            .cache
            .query(keys::tenants(), screen_options(&self.cache), move || {
                let client = client.clone();
                async move { client.tenants().list_owner().await.and_then(encode) }
            })
            .await?;
        Ok(state.ready().unwrap_or_default())
    }

    /// Create a tenant account owned by the current user
    pub async fn create(&self, form: TenantForm) -> RentlyResult<Tenant> {
        form.validate()?;

        let owner = self.session.user().ok_or_else(|| RentlyError::Unauthorized {
            message: "No active session".to_string(),
            context: ErrorContext::new("tenants_screen").with_operation("create"),
        })?;

        let request = CreateTenant {
            name: form.name,
            email: form.email,
            phone_number: form.phone_number,
            password: form.password,
            owner_id: owner.id,
        };

        let client = self.client.clone();
        let spec = MutationSpec::from_config(self.cache.config()).invalidates(keys::tenants());

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let request = request.clone();
                async move { client.tenants().create(&request).await }
            })
            .await
    }

    pub async fn update(&self, id: &str, form: TenantUpdateForm) -> RentlyResult<Tenant> {
        form.validate()?;

        let request = UpdateTenant {
            name: form.name,
            email: form.email,
            phone_number: form.phone_number,
        };

        let client = self.client.clone();
        let id = id.to_string();
        let spec = MutationSpec::from_config(self.cache.config()).invalidates(keys::tenants());

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let request = request.clone();
                let id = id.clone();
                async move { client.tenants().update(&id, &request).await }
            })
            .await
    }
}
