//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("CIVIC_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("CIVIC_DATABASE_URL".to_string()))?;
        let jwt_secret = env::var("CIVIC_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("CIVIC_JWT_SECRET".to_string()))?;
        let jwt_ttl_seconds = read_u64_with_default("CIVIC_JWT_TTL_SECONDS", 86_400)?;
        let http_addr =
            env::var("CIVIC_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        Ok(Self {
            http_addr,
            database_url,
            jwt_secret,
            jwt_ttl_seconds,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}
