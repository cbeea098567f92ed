pub mod cache;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod pipeline;
pub mod rate_limit;
pub mod scrape;
pub mod search;
pub mod stdio_service;
pub mod timing;
pub mod types;
pub mod web_client;

use std::sync::Arc;

pub use config::Config;
pub use pipeline::SearchPipeline;
// Re-export types for easy access
pub use types::*;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    // Owns the limiter and cache shared by every request
    pub pipeline: Arc<SearchPipeline>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pipeline = SearchPipeline::from_config(&config);
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: Config, pipeline: SearchPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }
}
