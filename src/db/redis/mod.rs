pub mod counter;

pub use counter::create_redis_client;
pub use counter::RedisRequestCounter;
