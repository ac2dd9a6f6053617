use std::sync::Arc;

use crate::{
    config::Config,
    db::{
        create_pool, create_redis_client, CollectionStore, InMemoryCollectionStore,
        InMemoryRequestCounter, PgCollectionStore, RedisRequestCounter, RequestCounter,
    },
    services::{ReqwestTransport, ResilientFetcher, UpstreamRequest},
};

/// Shared application state
pub struct AppState {
    pub fetcher: Arc<ResilientFetcher>,
    /// Request issued against the movie catalog on every `GET /movies`
    pub movie_catalog: UpstreamRequest,
    pub store: Arc<dyn CollectionStore>,
    pub request_counter: Arc<dyn RequestCounter>,
    pub favourite_genre_count: usize,
}

impl AppState {
    /// Wires the production collaborators described by `config`.
    ///
    /// Postgres and Redis are used when their URLs are configured; otherwise
    /// collections and the request count live in process memory.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(config.movie_api_timeout())?;
        let fetcher = ResilientFetcher::new(Arc::new(transport), config.retry_policy());

        let movie_catalog = config.movie_catalog_request();
        if !movie_catalog.verify_tls {
            tracing::warn!(
                url = %movie_catalog.url,
                "TLS certificate verification is disabled for the movie catalog; \
                 responses can be intercepted or forged"
            );
        }

        let store: Arc<dyn CollectionStore> = match &config.database_url {
            Some(database_url) => {
                let store = PgCollectionStore::new(create_pool(database_url).await?);
                store.migrate().await?;
                tracing::info!("Using PostgreSQL collection store");
                Arc::new(store)
            }
            None => {
                tracing::info!("DATABASE_URL not set, using in-memory collection store");
                Arc::new(InMemoryCollectionStore::new())
            }
        };

        let request_counter: Arc<dyn RequestCounter> = match &config.redis_url {
            Some(redis_url) => {
                let client = create_redis_client(redis_url)?;
                tracing::info!("Using Redis request counter");
                Arc::new(RedisRequestCounter::new(client).await?)
            }
            None => {
                tracing::info!("REDIS_URL not set, using in-memory request counter");
                Arc::new(InMemoryRequestCounter::new())
            }
        };

        Ok(Self {
            fetcher: Arc::new(fetcher),
            movie_catalog,
            store,
            request_counter,
            favourite_genre_count: config.favourite_genre_count,
        })
    }
}
