// Lodging Graph - Web Server
// REST API under /api/v1 with Axum

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use lodging_graph::{api, AppConfig, Lodging, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    config.init_logging();

    let store = config.open_store()?;
    let lodging = Arc::new(Lodging::new(store));
    info!(storage = ?config.storage, version = VERSION, "Store opened");

    let app = api::create_router(lodging);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server running at http://{}/api/v1", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
