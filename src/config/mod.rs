use serde::Deserialize;

// Top-level configuration, one section per concern
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Redis is optional: without a URL the auth cache is disabled
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub reservation_page_size: u32,
    pub reservation_max_page_size: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

// Flat view of the environment: DATABASE_URL -> database_url, etc.
#[derive(Debug, Deserialize)]
struct Settings {
    host: String,
    port: u16,
    environment: String,
    rust_log: String,
    database_url: Option<String>,
    db_pool_size: u32,
    redis_url: Option<String>,
    auth_cache_ttl_seconds: u64,
    reservation_page_size: u32,
    reservation_max_page_size: u32,
}

impl Config {
    /// Reads the process environment (call `dotenvy::dotenv()` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    fn from_source(env: config::Environment) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("environment", "development")?
            .set_default("rust_log", "theatre_api=debug,tower_http=debug")?
            .set_default("db_pool_size", 20)?
            .set_default("auth_cache_ttl_seconds", 300)?
            .set_default("reservation_page_size", 2)?
            .set_default("reservation_max_page_size", 100)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.try_into()
    }
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(s: Settings) -> Result<Self, Self::Error> {
        let url = s
            .database_url
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        if s.db_pool_size == 0 {
            return Err(ConfigError::NotPositive("DB_POOL_SIZE"));
        }
        if s.reservation_page_size == 0 {
            return Err(ConfigError::NotPositive("RESERVATION_PAGE_SIZE"));
        }
        if s.reservation_max_page_size == 0 {
            return Err(ConfigError::NotPositive("RESERVATION_MAX_PAGE_SIZE"));
        }

        Ok(Config {
            app: AppConfig {
                host: s.host,
                port: s.port,
                environment: s.environment,
                rust_log: s.rust_log,
            },
            database: DatabaseConfig {
                url,
                pool_size: s.db_pool_size,
            },
            redis: RedisConfig {
                url: s.redis_url.filter(|u| !u.is_empty()),
            },
            auth: AuthConfig {
                cache_ttl_seconds: s.auth_cache_ttl_seconds,
            },
            pagination: PaginationConfig {
                reservation_page_size: s.reservation_page_size,
                // the default page size must fit under the cap
                reservation_max_page_size: s
                    .reservation_max_page_size
                    .max(s.reservation_page_size),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default()
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = Config::from_source(env(&[("DATABASE_URL", "postgres://localhost/theatre")]))
            .unwrap();

        assert_eq!(cfg.app.port, 8000);
        assert_eq!(cfg.app.host, "0.0.0.0");
        assert_eq!(cfg.database.pool_size, 20);
        assert!(cfg.redis.url.is_none());
        assert_eq!(cfg.pagination.reservation_page_size, 2);
        assert_eq!(cfg.pagination.reservation_max_page_size, 100);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Config::from_source(env(&[("PORT", "9000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = Config::from_source(env(&[
            ("DATABASE_URL", "postgres://db/theatre"),
            ("PORT", "9001"),
            ("REDIS_URL", "redis://cache:6379"),
            ("RESERVATION_PAGE_SIZE", "10"),
        ]))
        .unwrap();

        assert_eq!(cfg.app.port, 9001);
        assert_eq!(cfg.redis.url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(cfg.pagination.reservation_page_size, 10);
    }

    #[test]
    fn zero_auth_cache_ttl_is_allowed() {
        let cfg = Config::from_source(env(&[
            ("DATABASE_URL", "postgres://db/theatre"),
            ("AUTH_CACHE_TTL_SECONDS", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.auth.cache_ttl_seconds, 0);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = Config::from_source(env(&[
            ("DATABASE_URL", "postgres://db/theatre"),
            ("RESERVATION_PAGE_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive("RESERVATION_PAGE_SIZE")));
    }
}
