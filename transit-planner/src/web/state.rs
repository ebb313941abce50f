//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedSwuClient;
use crate::departures::{DepartureSource, SourceError, StaticDepartureSource};
use crate::domain::{Departure, StopId};
use crate::network::{Network, StopCatalog};
use crate::planner::SearchConfig;

/// Where departures come from at runtime.
pub enum DepartureBackend {
    /// Live SWU API behind the response cache.
    Live(CachedSwuClient),
    /// Fixed data loaded from disk.
    Static(StaticDepartureSource),
}

impl DepartureSource for DepartureBackend {
    async fn departures_from(
        &self,
        stop: StopId,
        limit: usize,
    ) -> Result<Vec<Departure>, SourceError> {
        match self {
            DepartureBackend::Live(client) => client.departures_from(stop, limit).await,
            DepartureBackend::Static(source) => source.departures_from(stop, limit).await,
        }
    }

    async fn arrivals_at(&self, stop: StopId, limit: usize) -> Result<Vec<Departure>, SourceError> {
        match self {
            DepartureBackend::Live(client) => client.arrivals_at(stop, limit).await,
            DepartureBackend::Static(source) => source.arrivals_at(stop, limit).await,
        }
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Stop graph, built once at startup
    pub network: Arc<Network>,

    /// Stop name index
    pub catalog: Arc<StopCatalog>,

    /// Departure data backend
    pub departures: Arc<DepartureBackend>,

    /// Journey planner configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(network: Network, departures: DepartureBackend, config: SearchConfig) -> Self {
        let catalog = StopCatalog::from_network(&network);
        Self {
            network: Arc::new(network),
            catalog: Arc::new(catalog),
            departures: Arc::new(departures),
            config: Arc::new(config),
        }
    }
}
