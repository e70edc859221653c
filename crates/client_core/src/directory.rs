//! Business directory state: the fixed chain list plus the locations of the
//! currently selected chain.
//!
//! Location fetches are asynchronous. Each selection bumps a generation
//! counter; a fetch only applies its result if the generation it captured at
//! start is still current when it completes, so the last selection wins.

use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::DirectorySource;
use shared::domain::{Business, ChainId, Location, LocationId, LocationStats};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::filter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub selected_chain: Option<ChainId>,
    pub locations: Vec<Location>,
    pub is_loading: bool,
    generation: u64,
}

impl DirectorySnapshot {
    pub fn location_stats(&self) -> LocationStats {
        LocationStats::from_locations(&self.locations)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { chain_id: ChainId, count: usize },
    /// A newer selection (or a clear) happened while this fetch was in flight.
    Superseded { chain_id: ChainId },
}

pub struct DirectoryStore {
    source: Arc<dyn DirectorySource>,
    businesses: Vec<Business>,
    state: watch::Sender<DirectorySnapshot>,
}

impl DirectoryStore {
    pub fn new(source: Arc<dyn DirectorySource>, businesses: Vec<Business>) -> Self {
        let (state, _) = watch::channel(DirectorySnapshot::default());
        Self {
            source,
            businesses,
            state,
        }
    }

    pub async fn load(source: Arc<dyn DirectorySource>) -> Result<Self> {
        let businesses = source
            .list_businesses()
            .await
            .context("failed to load business directory")?;
        info!(count = businesses.len(), "loaded business directory");
        Ok(Self::new(source, businesses))
    }

    pub fn list_entities(&self) -> &[Business] {
        &self.businesses
    }

    pub fn search_entities(&self, query: &str) -> Vec<&Business> {
        filter::filter(&self.businesses, query)
    }

    pub fn find_entity(&self, chain_id: &ChainId) -> Option<&Business> {
        self.businesses.iter().find(|b| &b.chain_id == chain_id)
    }

    /// Selects `chain_id` and fetches its locations on a spawned task.
    ///
    /// The loading flag is raised before this returns. Must be called from
    /// within a tokio runtime.
    pub fn select_entity(self: &Arc<Self>, chain_id: ChainId) -> JoinHandle<FetchOutcome> {
        let generation = self.begin_fetch(&chain_id);
        let store = Arc::clone(self);
        tokio::spawn(async move { store.complete_fetch(chain_id, generation).await })
    }

    /// Like [`DirectoryStore::select_entity`], but drives the fetch on the caller's task.
    pub async fn select_entity_and_fetch(&self, chain_id: ChainId) -> FetchOutcome {
        let generation = self.begin_fetch(&chain_id);
        self.complete_fetch(chain_id, generation).await
    }

    pub fn clear_selection(&self) {
        self.state.send_modify(|state| {
            state.generation += 1;
            state.selected_chain = None;
            state.locations.clear();
            state.is_loading = false;
        });
        debug!("cleared chain selection");
    }

    pub fn current_children(&self) -> Vec<Location> {
        self.state.borrow().locations.clone()
    }

    pub fn search_children(&self, query: &str) -> Vec<Location> {
        let state = self.state.borrow();
        filter::filter(&state.locations, query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn find_child(&self, location_id: &LocationId) -> Option<Location> {
        self.state
            .borrow()
            .locations
            .iter()
            .find(|l| &l.id == location_id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn selected_entity_id(&self) -> Option<ChainId> {
        self.state.borrow().selected_chain.clone()
    }

    pub fn selected_entity(&self) -> Option<&Business> {
        let chain_id = self.selected_entity_id()?;
        self.find_entity(&chain_id)
    }

    pub fn location_stats(&self) -> LocationStats {
        self.state.borrow().location_stats()
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.state.subscribe()
    }

    fn begin_fetch(&self, chain_id: &ChainId) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.selected_chain = Some(chain_id.clone());
            state.locations.clear();
            state.is_loading = true;
            generation = state.generation;
        });
        debug!(chain_id = %chain_id, generation, "fetching locations");
        generation
    }

    async fn complete_fetch(&self, chain_id: ChainId, generation: u64) -> FetchOutcome {
        let locations = match self.source.fetch_locations(&chain_id).await {
            Ok(locations) => locations,
            Err(err) => {
                warn!(chain_id = %chain_id, error = %err, "location fetch failed; showing none");
                Vec::new()
            }
        };
        let count = locations.len();

        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.locations = locations;
            state.is_loading = false;
            true
        });

        if applied {
            debug!(chain_id = %chain_id, count, "applied fetched locations");
            FetchOutcome::Applied { chain_id, count }
        } else {
            warn!(chain_id = %chain_id, generation, "discarding stale location fetch");
            FetchOutcome::Superseded { chain_id }
        }
    }
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
