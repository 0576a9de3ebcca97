//! `japa serve` — run the REST API.

use crate::config::Config;
use crate::renderer::chromium::find_chromium;
use crate::rest::{self, AppState};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Serve the API until interrupted.
pub async fn run(config: Config) -> Result<()> {
    info!("starting JapaAdvisor v{}", env!("CARGO_PKG_VERSION"));

    if find_chromium(config.fetch.chromium_path.as_ref()).is_none() {
        warn!("Chromium not found; Canada, USA and Germany will serve fallback data");
    }
    if config.llm.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /generate-roadmap will return errors");
    }

    let addr = SocketAddr::new(config.bind, config.port);
    let state = Arc::new(AppState::from_config(&config));

    tokio::select! {
        result = rest::start(addr, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
            Ok(())
        }
    }
}
