//! Property endpoints

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rently_core::RentlyResult;

use crate::transport::ApiTransport;

/// A property owned by the current user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    pub price: f64,
    pub rented: bool,
}

/// Payload for `POST /properties`
#[derive(Debug, Clone, Serialize)]
pub struct CreateProperty {
    pub name: String,
    pub address: String,
    pub price: f64,
}

/// Payload for `PUT /properties/:id`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateProperty {
    pub name: String,
    pub address: String,
    pub price: f64,
}

/// Client for the property endpoints
pub struct PropertyService {
    transport: Arc<ApiTransport>,
}

impl PropertyService {
    pub(crate) fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// List properties belonging to the current owner
    pub async fn list_owner(&self) -> RentlyResult<Vec<Property>> {
        self.transport.get("/properties/owner").await
    }

    pub async fn create(&self, request: &CreateProperty) -> RentlyResult<Property> {
        self.transport.post("/properties", request).await
    }

    pub async fn update(&self, id: &str, request: &UpdateProperty) -> RentlyResult<Property> {
        self.transport
            .put(&format!("/properties/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> RentlyResult<()> {
        self.transport.delete(&format!("/properties/{}", id)).await
    }
}
