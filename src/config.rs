use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the nutrition REST API, without a trailing slash.
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// When set, upstream tokens survive restarts in this JSON file.
    pub token_store_path: Option<PathBuf>,
    pub page_size: usize,
    pub notification_ttl_secs: i64,
    /// How often expired sessions are dropped from memory and the token store.
    pub session_sweep_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutricare-portal".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutricare-web".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
        };
        Ok(Self {
            api_base_url,
            api_timeout_secs: parse_or("API_TIMEOUT_SECS", 30),
            jwt,
            token_store_path: std::env::var("TOKEN_STORE_PATH").ok().map(PathBuf::from),
            page_size: parse_or::<usize>("PAGE_SIZE", 6).max(1),
            notification_ttl_secs: parse_or("NOTIFICATION_TTL_SECS", 3),
            session_sweep_secs: parse_or::<u64>("SESSION_SWEEP_SECS", 300).max(1),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
