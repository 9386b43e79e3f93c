//! Rental endpoints

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rently_core::RentlyResult;

use crate::transport::ApiTransport;

/// An active or finished rental agreement
///
/// Timestamps keep the wire's mixed naming: the rental fields are camelCase
/// while the audit columns stay snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub id: String,
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "dueDay")]
    pub due_day: u8,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for `POST /rentals`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRental {
    pub property_id: String,
    pub start_date: String,
    pub due_day: u8,
    pub tenant_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct FinishRental<'a> {
    #[serde(rename = "endDate")]
    end_date: &'a str,
}

/// Client for the rental endpoints
pub struct RentalService {
    transport: Arc<ApiTransport>,
}

impl RentalService {
    pub(crate) fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// List rentals for the current owner
    pub async fn list(&self) -> RentlyResult<Vec<Rental>> {
        self.transport.get("/rentals").await
    }

    /// List rentals for one property
    pub async fn list_by_property(&self, property_id: &str) -> RentlyResult<Vec<Rental>> {
        self.transport
            .get(&format!("/rentals/property/{}", property_id))
            .await
    }

    pub async fn create(&self, request: &CreateRental) -> RentlyResult<Rental> {
        self.transport.post("/rentals", request).await
    }

    /// Close a rental with an end date
    pub async fn finish(&self, id: &str, end_date: &str) -> RentlyResult<Rental> {
        self.transport
            .patch(&format!("/rentals/{}/end", id), &FinishRental { end_date })
            .await
    }
}
