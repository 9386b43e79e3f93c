//! Dashboard screen

use std::sync::Arc;

use rently_client::{ApiClient, DashboardStats};
use rently_core::{ErrorContext, RentlyError, RentlyResult};

use crate::cache::{encode, QueryCache, QueryState};

use super::{keys, screen_options};

/// Aggregate statistics bound to the cache
pub struct DashboardScreen {
    client: ApiClient,
    cache: Arc<QueryCache>,
}

impl DashboardScreen {
    pub(crate) fn new(client: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { client, cache }
    }

    /// Owner statistics, served through the cache
    pub async fn stats(&self) -> RentlyResult<DashboardStats> {
        let client = self.client.clone();
        let state = self
            .cache
            .query(
                keys::dashboard_stats(),
                screen_options(&self.cache),
                move || {
                    let client = client.clone();
                    async move { client.dashboard().my_stats().await.and_then(encode) }
                },
            )
            .await?;

        match state {
            QueryState::Ready(stats) => Ok(stats),
            QueryState::NotReady => Err(RentlyError::Cache {
                message: "Dashboard statistics query is disabled".to_string(),
                context: ErrorContext::new("dashboard_screen").with_operation("stats"),
            }),
        }
    }
}
