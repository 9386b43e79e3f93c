//! Dashboard endpoints

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rently_core::RentlyResult;

use crate::transport::ApiTransport;

/// Aggregate counts for the owner dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "totalUsers")]
    pub total_users: u64,
    #[serde(rename = "totalProperties")]
    pub total_properties: u64,
    #[serde(rename = "totalRentals")]
    pub total_rentals: u64,
    #[serde(rename = "activeRentals")]
    pub active_rentals: u64,
    #[serde(rename = "totalProperties_rented")]
    pub properties_rented: u64,
    #[serde(rename = "totalProperties_available")]
    pub properties_available: u64,
    #[serde(rename = "totalPayments")]
    pub total_payments: u64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
}

/// Client for the dashboard endpoints
pub struct DashboardService {
    transport: Arc<ApiTransport>,
}

impl DashboardService {
    pub(crate) fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Aggregate counts for the current owner
    pub async fn my_stats(&self) -> RentlyResult<DashboardStats> {
        self.transport.get("/dashboard/my-stats").await
    }
}
