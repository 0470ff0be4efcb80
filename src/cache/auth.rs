use crate::cache::CacheService;
use redis::AsyncCommands;

fn token_key(key_hash: &str) -> String {
    format!("auth:token:{}", key_hash)
}

impl CacheService {
    /// Cached user (JSON) for a token hash, if any.
    pub async fn get_cached_auth_user(
        &self,
        key_hash: &str,
    ) -> Result<Option<String>, redis::RedisError> {
        let Some(redis) = &self.redis else {
            return Ok(None);
        };
        let mut conn = redis.conn.clone();
        conn.get(token_key(key_hash)).await
    }

    /// Store a resolved user under its token hash for the configured TTL.
    pub async fn cache_auth_user(
        &self,
        key_hash: &str,
        user_data: &str,
    ) -> Result<(), redis::RedisError> {
        let Some(redis) = self.redis.as_ref().filter(|_| self.auth_ttl_seconds > 0) else {
            return Ok(());
        };
        let mut conn = redis.conn.clone();
        conn.set_ex(token_key(key_hash), user_data, self.auth_ttl_seconds)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_keys_are_namespaced() {
        assert_eq!(token_key("abc"), "auth:token:abc");
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = CacheService::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.get_cached_auth_user("abc").await.unwrap(), None);
        cache.cache_auth_user("abc", "{}").await.unwrap();
    }
}
