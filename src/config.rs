use crate::error::Error;
use std::str::FromStr;

pub static DATABASE_URL: &str = "DATABASE_URL";
pub static JWT_SECRET: &str = "JWT_SECRET";
pub static BIND_ADDRESS: &str = "BIND_ADDRESS";
pub static PORT: &str = "PORT";
pub static DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub static MEDIA_PATH: &str = "MEDIA_PATH";
pub static MEDIA_BASE_URL: &str = "MEDIA_BASE_URL";
pub static SIGNED_URL_TTL_SECS: &str = "SIGNED_URL_TTL_SECS";
pub static SIGNING_CONCURRENCY: &str = "SIGNING_CONCURRENCY";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: Vec<u8>,
    pub bind_address: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub media_path: String,
    pub media_base_url: String,
    pub signed_url_ttl_secs: i64,
    pub signing_concurrency: usize,
}

impl Config {
    /// Reads the configuration from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| Error::ConfigError(format!("environment variable {} not been set", key)));
        Ok(Self {
            database_url: required(DATABASE_URL)?,
            jwt_secret: required(JWT_SECRET)?.into_bytes(),
            bind_address: lookup(BIND_ADDRESS).unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, PORT, 8000)?,
            db_max_connections: parse_or(&lookup, DB_MAX_CONNECTIONS, 5)?,
            media_path: lookup(MEDIA_PATH).unwrap_or_else(|| "./media".into()),
            media_base_url: lookup(MEDIA_BASE_URL).unwrap_or_else(|| "http://localhost:8000".into()),
            signed_url_ttl_secs: parse_or(&lookup, SIGNED_URL_TTL_SECS, 3600)?,
            signing_concurrency: parse_or::<usize, _>(&lookup, SIGNING_CONCURRENCY, 16)?.max(1),
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e| Error::ConfigError(format!("invalid {}: {}", key, e))),
    }
}
