use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::itunes::ItunesClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmSearchService, SearchService};

/// Build the HTTP client every catalog call goes through.
/// The timeout here bounds each individual attempt.
fn build_shared_http_client(timeout_seconds: u64, user_agent: &str) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub itunes: Arc<ItunesClient>,

    pub search_service: Arc<dyn SearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires services around an already opened store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(
            config.catalog.request_timeout_seconds,
            &config.catalog.user_agent,
        )?;

        let itunes = Arc::new(ItunesClient::with_shared_client(
            http_client,
            config.catalog_config(),
        ));

        let search_service = Arc::new(SeaOrmSearchService::new(store.clone(), itunes.clone()))
            as Arc<dyn SearchService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            itunes,
            search_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
