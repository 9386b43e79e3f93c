//! Rentals screen

use std::sync::Arc;

use chrono::NaiveDate;

use rently_client::{ApiClient, CreateRental, Rental};
use rently_core::{validation_error, RentlyResult};

use crate::cache::{encode, MutationSpec, QueryCache, QueryState};

use super::{keys, screen_options};

/// New-rental form input
#[derive(Debug, Clone)]
pub struct RentalForm {
    pub property_id: String,
    pub tenant_id: String,
    /// ISO date, e.g. "2024-01-01"
    pub start_date: String,
    /// Day of month the rent is due
    pub due_day: u8,
}

impl RentalForm {
    pub fn validate(&self) -> RentlyResult<()> {
        if self.property_id.trim().is_empty() {
            return Err(validation_error!(
                "Property is required",
                "propertyId",
                "rentals_screen"
            ));
        }
        if self.tenant_id.trim().is_empty() {
            return Err(validation_error!(
                "Tenant is required",
                "tenantId",
                "rentals_screen"
            ));
        }
        if NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").is_err() {
            return Err(validation_error!(
                "Start date must be a valid YYYY-MM-DD date",
                "startDate",
                "rentals_screen"
            ));
        }
        if !(1..=31).contains(&self.due_day) {
            return Err(validation_error!(
                "Due day must be between 1 and 31",
                "dueDay",
                "rentals_screen"
            ));
        }
        Ok(())
    }
}

/// Rental listing and lifecycle bound to the cache
pub struct RentalsScreen {
    client: ApiClient,
    cache: Arc<QueryCache>,
}

impl RentalsScreen {
    pub(crate) fn new(client: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { client, cache }
    }

    /// Rentals of the current owner, served through the cache
    pub async fn list(&self) -> RentlyResult<Vec<Rental>> {
        let client = self.client.clone();
        let state = self
            .cache
            .query(keys::rentals(), screen_options(&self.cache), move || {
                let client = client.clone();
                async move { client.rentals().list().await.and_then(encode) }
            })
            .await?;
        Ok(state.ready().unwrap_or_default())
    }

    /// Rentals for one property; not ready until a property id is chosen
    pub async fn by_property(&self, property_id: &str) -> RentlyResult<QueryState<Vec<Rental>>> {
        let enabled = !property_id.trim().is_empty();
        let client = self.client.clone();
        let id = property_id.to_string();

        self.cache
            .query(
                keys::rentals_by_property(property_id),
                screen_options(&self.cache).enabled(enabled),
                move || {
                    let client = client.clone();
                    let id = id.clone();
                    async move { client.rentals().list_by_property(&id).await.and_then(encode) }
                },
            )
            .await
    }

    /// Create a rental; occupancy changed, so the property list goes stale
    /// along with the rentals
    pub async fn create(&self, form: RentalForm) -> RentlyResult<Rental> {
        form.validate()?;

        let request = CreateRental {
            property_id: form.property_id,
            start_date: form.start_date,
            due_day: form.due_day,
            tenant_id: form.tenant_id,
        };

        let client = self.client.clone();
        let spec = MutationSpec::from_config(self.cache.config())
            .invalidates(keys::rentals())
            .invalidates(keys::properties());

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let request = request.clone();
                async move { client.rentals().create(&request).await }
            })
            .await
    }

    /// Close a rental with an end date
    pub async fn finish(&self, rental_id: &str, end_date: &str) -> RentlyResult<Rental> {
        if NaiveDate::parse_from_str(end_date, "%Y-%m-%d").is_err() {
            return Err(validation_error!(
                "End date must be a valid YYYY-MM-DD date",
                "endDate",
                "rentals_screen"
            ));
        }

        let client = self.client.clone();
        let id = rental_id.to_string();
        let end = end_date.to_string();
        let spec = MutationSpec::from_config(self.cache.config()).invalidates(keys::rentals());

        self.cache
            .mutate(spec, move || {
                let client = client.clone();
                let id = id.clone();
                let end = end.clone();
                async move { client.rentals().finish(&id, &end).await }
            })
            .await
    }
}
