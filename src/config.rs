//! Configuration loaded from the environment (and `.env` when present).

use std::{env, fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use tracing::debug;

use crate::pricing::calendar::{CivilCalendar, DEFAULT_MAX_STAY_NIGHTS, DEFAULT_UTC_OFFSET_HOURS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    pub calendar: CivilCalendar,
    /// Refuse to quote properties whose seasons overlap instead of warning
    pub strict_seasons: bool,
    pub cache_ttl: Duration,
    pub cache_warm_interval: Duration,
}

impl Config {
    /// Load from process environment, reading `.env` first if it exists
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let offset_hours: i32 = try_load(&lookup, "CALENDAR_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS)?;
        let max_stay_nights: u32 = at_least_one(
            "MAX_STAY_NIGHTS",
            try_load(&lookup, "MAX_STAY_NIGHTS", DEFAULT_MAX_STAY_NIGHTS)?,
        )?;
        let calendar = CivilCalendar::from_utc_offset_hours(offset_hours)
            .ok_or_else(|| ConfigError::Invalid {
                key: "CALENDAR_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
                reason: "must be between -23 and 23".to_string(),
            })?
            .with_max_stay_nights(max_stay_nights);

        let max_connections: u32 = at_least_one(
            "DATABASE_MAX_CONNECTIONS",
            try_load(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        )?;
        let cache_ttl_secs: u64 = at_least_one(
            "CACHE_TTL_SECS",
            try_load(&lookup, "CACHE_TTL_SECS", 600)?,
        )?;
        // tokio's interval panics on a zero period
        let warm_interval_secs: u64 = at_least_one(
            "CACHE_WARM_INTERVAL_SECS",
            try_load(&lookup, "CACHE_WARM_INTERVAL_SECS", 600)?,
        )?;

        Ok(Self {
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            database_max_connections: max_connections,
            calendar,
            strict_seasons: try_load(&lookup, "PRICING_STRICT_SEASONS", false)?,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_warm_interval: Duration::from_secs(warm_interval_secs),
        })
    }
}

fn at_least_one<T>(key: &'static str, value: T) -> Result<T, ConfigError>
where
    T: PartialOrd + From<u8> + Display,
{
    if value < T::from(1) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
        None => {
            debug!("{key} not set, using default");
            Ok(default)
        }
    }
}
