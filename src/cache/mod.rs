use crate::redis_client::RedisClient;
use tracing::info;

pub mod auth;

/// Redis-backed cache. Without a Redis connection every lookup misses and
/// every store is a no-op, so callers always fall back to the database.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    auth_ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, auth_ttl_seconds: u64) -> Self {
        info!("Auth cache enabled (ttl {}s)", auth_ttl_seconds);
        Self {
            redis: Some(redis),
            auth_ttl_seconds,
        }
    }

    pub fn disabled() -> Self {
        Self {
            redis: None,
            auth_ttl_seconds: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }
}
