use std::sync::Arc;
use tracing::info;

use mql5_docs_mcp::{logging, mcp, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Get configuration from environment
    let config = Config::from_env();
    config.validate()?;
    logging::init(&config)?;

    info!("Starting MQL5 docs server");
    info!("Search API: {}", config.search_api_url);

    let addr = config.http_addr.clone();
    let state = Arc::new(AppState::new(config));
    let app = mcp::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("MQL5 docs server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
