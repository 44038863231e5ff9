use std::sync::Arc;

use crate::{api::ApiStore, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ApiStore>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize the in-memory store and seed the administrator
        let store = ApiStore::new(config.server.node_id);
        store
            .seed_admin(&config.admin)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed administrator: {}", e))?;

        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }
}
