use redis::{aio::ConnectionManager, Client};

#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        // reconnects on its own after the server drops
        let conn = ConnectionManager::new(client).await?;
        Ok(RedisClient { conn })
    }
}
