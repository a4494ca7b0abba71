use std::sync::Arc;

use process::{
    Ingestor,
    database::RedisStore,
    remote::FecClient,
    store::{CandidateStore, MemoryStore},
};
use tracing::info;

use super::{
    config::{Config, StoreBackend},
    error::AppError,
    scheduler::IngestScheduler,
};

pub struct State {
    pub config: Config,
    pub store: Arc<dyn CandidateStore>,
    pub scheduler: Arc<IngestScheduler>,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let store: Arc<dyn CandidateStore> = match config.store {
            StoreBackend::Redis => {
                info!("Connecting to Redis at {}", config.redis_url);
                Arc::new(RedisStore::connect(&config.redis_url).await?)
            }
            StoreBackend::Memory => {
                info!("Using in-memory candidate store");
                Arc::new(MemoryStore::new())
            }
        };

        let source = Arc::new(
            FecClient::new(
                config.fec_base_url.clone(),
                config.fec_api_key.clone(),
                config.fec_per_page,
            )
            .with_candidates_url(config.fec_candidates_url.clone()),
        );

        let scheduler = IngestScheduler::new(
            Ingestor::new(source, store.clone()),
            config.ingest_interval,
            config.ingest_on_start,
        );

        Ok(Self::from_parts(config, store, scheduler))
    }

    pub fn from_parts(
        config: Config,
        store: Arc<dyn CandidateStore>,
        scheduler: Arc<IngestScheduler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            scheduler,
        })
    }
}
