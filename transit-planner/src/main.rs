use std::error::Error;
use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_planner::cache::{CacheConfig, CachedSource};
use transit_planner::departures::StaticDepartureSource;
use transit_planner::network::{Network, load_patterns};
use transit_planner::planner::SearchConfig;
use transit_planner::swu::{DEFAULT_BASE_URL, SwuClient, SwuConfig};
use transit_planner::web::{AppState, DepartureBackend, create_router};

/// Pattern feed used when `NETWORK_FILE` is unset.
const DEFAULT_NETWORK_FILE: &str = "data/network.json";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transit_planner=info,tower_http=info")),
        )
        .init();

    // Build the stop network once; every request shares it
    let network_file =
        std::env::var("NETWORK_FILE").unwrap_or_else(|_| DEFAULT_NETWORK_FILE.to_string());
    let search_config = SearchConfig::default();
    let patterns = load_patterns(&network_file)?;
    let network = Network::build(&patterns, search_config.travel_time.clone());
    info!(
        file = %network_file,
        patterns = network.pattern_count(),
        stops = network.stop_count(),
        edges = network.edge_count(),
        "Loaded network"
    );
    if network.stop_count() == 0 {
        warn!("Network has no stops; every plan will fail");
    }

    // Mock mode serves departures from disk instead of the SWU API
    let departures = match std::env::var("MOCK_DEPARTURES_DIR") {
        Ok(dir) => {
            let source = StaticDepartureSource::from_dir(&dir)?;
            info!(dir = %dir, stops = source.stops().len(), "Using static departures");
            DepartureBackend::Static(source)
        }
        Err(_) => {
            let base_url =
                std::env::var("SWU_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
            info!(base_url = %base_url, "Using live SWU departures");
            let client = SwuClient::new(SwuConfig::new().with_base_url(base_url))?;
            DepartureBackend::Live(CachedSource::new(client, &CacheConfig::default()))
        }
    };

    let state = AppState::new(network, departures, search_config);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "Transit planner listening");
    info!("  GET  /health            - Health check");
    info!("  GET  /api/stops/search  - Search stops by name");
    info!("  POST /journey/plan      - Plan a journey");

    axum::serve(listener, app).await?;
    Ok(())
}
