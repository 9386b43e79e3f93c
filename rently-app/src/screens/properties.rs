//! Properties screen

use std::sync::Arc;

use rently_client::{ApiClient, CreateProperty, Property, UpdateProperty};
use rently_core::{validation_error, RentlyResult};

use crate::cache::{encode, MutationSpec, QueryCache};

use super::{keys, screen_options};

/// Property form input shared by create and update
#[derive(Debug, Clone)]
pub struct PropertyForm {
    pub name: String,
    pub address: String,
    pub price: f64,
}

impl PropertyForm {
    pub fn validate(&self) -> RentlyResult<()> {
        if self.name.trim().is_empty() {
            return Err(validation_error!(
                "Name is required",
                "name",
                "properties_screen"
            ));
        }
        if self.address.trim().is_empty() {
            return Err(validation_error!(
                "Address is required",
                "address",
                "properties_screen"
            ));
        }
        if self.price <= 0.0 {
            return Err(validation_error!(
                "Price must be greater than zero",
                "price",
                "properties_screen"
            ));
        }
        Ok(())
    }
}

/// Property listing and CRUD bound to the cache
pub struct PropertiesScreen {
    client: ApiClient,
    cache: Arc<QueryCache>,
}

impl PropertiesScreen {
    pub(crate) fn new(client: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { client, cache }
    }

    /// Properties of the current owner, served through the cache
    pub async fn list(&self) -> RentlyResult<Vec<Property>> {
        let client = self.client.clone();
        let state = self
            .cache
            .query(
                keys::properties_owner(),
                screen_options(&self.cache),
                move || {
                    let client = client.clone();
                    async move { client.properties().list_owner().await.and_then(encode) }
                },
            )
            .await?;
        Ok(state.ready().unwrap_or_default())
    }

    pub async fn create(&self, form: PropertyForm) -> RentlyResult<Property> {
        form.validate()?;

        let request = CreateProperty {
            name: form.name,
            address: form.address,
            price: form.price,
        };

        let client = self.client.clone();
        let spec = MutationSpec::from_config(self.cache.config())
            .invalidates(keys::properties_owner());

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let request = request.clone();
                async move { client.properties().create(&request).await }
            })
            .await
    }

    /// Update a property; the echoed entity is written through to its
    /// detail key
    pub async fn update(&self, id: &str, form: PropertyForm) -> RentlyResult<Property> {
        form.validate()?;

        let request = UpdateProperty {
            name: form.name,
            address: form.address,
            price: form.price,
        };

        let client = self.client.clone();
        let id = id.to_string();
        let spec = MutationSpec::from_config(self.cache.config())
            .invalidates(keys::properties_owner())
            .seeds(keys::property(&id));

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let request = request.clone();
                let id = id.clone();
                async move { client.properties().update(&id, &request).await }
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> RentlyResult<()> {
        let client = self.client.clone();
        let id_owned = id.to_string();
        let spec = MutationSpec::from_config(self.cache.config())
            .invalidates(keys::properties_owner());

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let id = id_owned.clone();
                async move { client.properties().delete(&id).await }
            })
            .await?;

        // The detail entry, if any, no longer describes anything
        self.cache.remove(&keys::property(id)).await;
        Ok(())
    }
}
