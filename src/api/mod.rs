//! API module for the subtitle service
//!
//! Provides the subtitle endpoint, a health check and the static front-end.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::subtitles::SubtitleGenerator;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, AppState};

/// API Server for handling REST requests
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Arc<Config>, generator: Arc<SubtitleGenerator>) -> Self {
        Self {
            state: AppState { generator, config },
        }
    }

    /// Router for this server, used directly by tests
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start the API server and run until shutdown
    pub async fn run(self) -> Result<()> {
        info!("🚀 Starting API server on {}", self.state.config.bind_address());
        server::start_http_server(self.state).await
    }
}
