use std::str::FromStr;

use crate::errors::ServerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ServerError::EnvironmentError(format!(
                "NOTABENE_STORE must be `postgres` or `memory`, got `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub pool_size: u32,
    pub rate_limit_max_requests: u32,
    pub rate_limit_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup so it can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("NOTABENE_STORE") {
            Some(kind) => kind.parse()?,
            None => StoreKind::Postgres,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ServerError::EnvironmentError(
                "DATABASE_URL must be set when NOTABENE_STORE is postgres".to_string(),
            ));
        }

        let config = Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            store,
            database_url,
            pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", 10)?,
            rate_limit_max_requests: parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 120)?,
            rate_limit_interval_secs: parse_or(&lookup, "RATE_LIMIT_INTERVAL_SECS", 60)?,
        };

        if config.pool_size == 0 {
            return Err(ServerError::EnvironmentError(
                "DATABASE_POOL_SIZE must be a positive integer".to_string(),
            ));
        }
        if config.rate_limit_max_requests == 0 || config.rate_limit_interval_secs == 0 {
            return Err(ServerError::EnvironmentError(
                "rate limit settings must be positive integers".to_string(),
            ));
        }

        Ok(config)
    }

    /// Milliseconds between two replenished request slots of a client's burst.
    pub fn rate_limit_replenish_ms(&self) -> u64 {
        (self.rate_limit_interval_secs.saturating_mul(1000) / self.rate_limit_max_requests as u64).max(1)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ServerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            ServerError::EnvironmentError(format!("{key} must be a positive integer, got `{raw}`"))
        }),
        None => Ok(default),
    }
}
