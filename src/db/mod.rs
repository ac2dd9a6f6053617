pub mod counter;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use counter::{InMemoryRequestCounter, RequestCounter};
pub use memory::InMemoryCollectionStore;
pub use postgres::{create_pool, PgCollectionStore};
pub use self::redis::{create_redis_client, RedisRequestCounter};
pub use store::CollectionStore;
