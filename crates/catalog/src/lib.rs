use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Application, Business, ChainId, Location};
use tracing::debug;

mod fixtures;

pub const DEFAULT_FETCH_LATENCY: Duration = Duration::from_millis(1000);

/// Upstream provider of the business directory.
///
/// Implementations hand back already-parsed values; the transport is theirs.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn list_businesses(&self) -> Result<Vec<Business>>;
    /// Unknown chains yield an empty list rather than an error.
    async fn fetch_locations(&self, chain_id: &ChainId) -> Result<Vec<Location>>;
}

/// Built-in mock directory with a fixed artificial fetch latency.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    fetch_latency: Duration,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_LATENCY)
    }
}

impl StaticCatalog {
    pub fn new(fetch_latency: Duration) -> Self {
        Self { fetch_latency }
    }

    pub fn fetch_latency(&self) -> Duration {
        self.fetch_latency
    }

    pub fn businesses(&self) -> Vec<Business> {
        fixtures::businesses()
    }

    pub fn locations_for(&self, chain_id: &ChainId) -> Vec<Location> {
        fixtures::locations_for(chain_id)
    }

    pub fn applications(&self) -> Vec<Application> {
        fixtures::applications()
    }
}

#[async_trait]
impl DirectorySource for StaticCatalog {
    async fn list_businesses(&self) -> Result<Vec<Business>> {
        Ok(self.businesses())
    }

    async fn fetch_locations(&self, chain_id: &ChainId) -> Result<Vec<Location>> {
        if !self.fetch_latency.is_zero() {
            tokio::time::sleep(self.fetch_latency).await;
        }
        let locations = self.locations_for(chain_id);
        debug!(chain_id = %chain_id, count = locations.len(), "served mock locations");
        Ok(locations)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
