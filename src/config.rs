use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// JSON file backing the durable key/value storage
    pub data_file: String,
    pub jwt_secret: String,
    /// Development stand-in for real credential verification
    pub shared_password: String,
    pub session_ttl: usize,
    pub remember_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(key, default)
        .parse()
        .with_context(|| format!("{key} must be a number"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            data_file: var_or("DATA_FILE", "data/worktrack.json"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            shared_password: var_or("SHARED_PASSWORD", "password123"),
            session_ttl: parse_var("SESSION_TTL", "28800")?, // 8 hours
            remember_ttl: parse_var("REMEMBER_TTL", "2592000")?, // 30 days

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: var_or("API_PREFIX", "/api"),
            log_dir: var_or("LOG_DIR", "logs"),
        })
    }

    /// Settings for in-process tests; nothing is read from the environment.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            data_file: String::new(),
            jwt_secret: "test-secret".to_string(),
            shared_password: "password123".to_string(),
            session_ttl: 3600,
            remember_ttl: 86400,
            rate_login_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}
