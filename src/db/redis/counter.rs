use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::{db::RequestCounter, error::AppResult};

/// Redis key holding the shared request total
pub const REQUEST_COUNT_KEY: &str = "request_count";

/// Creates a Redis client for the request counter
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// [`RequestCounter`] shared by every instance pointed at the same Redis
#[derive(Clone)]
pub struct RedisRequestCounter {
    conn: ConnectionManager,
}

impl RedisRequestCounter {
    /// Connects through a connection manager, which reconnects on its own
    pub async fn new(client: Client) -> AppResult<Self> {
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl RequestCounter for RedisRequestCounter {
    async fn increment(&self) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = conn.incr(REQUEST_COUNT_KEY, 1u64).await?;
        Ok(count)
    }

    async fn current(&self) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let count: Option<u64> = conn.get(REQUEST_COUNT_KEY).await?;
        Ok(count.unwrap_or(0))
    }

    async fn reset(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(REQUEST_COUNT_KEY, 0u64).await?;
        Ok(())
    }
}
