pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::KvStore;
use middleware::cors::CorsPolicy;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub config: Arc<Config>,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KvStore>) -> anyhow::Result<Self> {
        let cors = CorsPolicy::new(&config.allowed_origins)?;
        Ok(Self {
            store,
            config: Arc::new(config),
            cors: Arc::new(cors),
        })
    }
}
