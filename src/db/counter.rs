use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AppResult;

/// Counts requests served by this API.
///
/// Injected through application state; implementations decide whether the
/// count is per-process or shared between instances.
#[async_trait::async_trait]
pub trait RequestCounter: Send + Sync {
    /// Adds one request and returns the new total
    async fn increment(&self) -> AppResult<u64>;

    async fn current(&self) -> AppResult<u64>;

    async fn reset(&self) -> AppResult<()>;
}

/// Per-process counter, used when no Redis is configured
#[derive(Debug, Default)]
pub struct InMemoryRequestCounter {
    count: AtomicU64,
}

impl InMemoryRequestCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RequestCounter for InMemoryRequestCounter {
    async fn increment(&self) -> AppResult<u64> {
        Ok(self.count.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn current(&self) -> AppResult<u64> {
        Ok(self.count.load(Ordering::Relaxed))
    }

    async fn reset(&self) -> AppResult<()> {
        self.count.store(0, Ordering::Relaxed);
        Ok(())
    }
}
