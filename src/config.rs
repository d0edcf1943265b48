use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

use crate::engine::RecommendationPolicy;

#[derive(Error, Debug, PartialEq)]
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

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Without a database URL the service keeps everything in memory, and
    /// then needs `seed_file` to know any users or stores.
    pub database_url: Option<String>,
    pub seed_file: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub policy: RecommendationPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RecommendationPolicy::default();

        let policy = RecommendationPolicy {
            recommend_min_count: parse_or(
                &lookup,
                "RECOMMEND_MIN_COUNT",
                defaults.recommend_min_count,
            )?,
            recommend_min_average: parse_or(
                &lookup,
                "RECOMMEND_MIN_AVERAGE",
                defaults.recommend_min_average,
            )?,
            needs_rating_min_count: parse_or(
                &lookup,
                "NEEDS_RATING_MIN_COUNT",
                defaults.needs_rating_min_count,
            )?,
        };
        if !(1.0..=5.0).contains(&policy.recommend_min_average) {
            return Err(ConfigError::Invalid {
                key: "RECOMMEND_MIN_AVERAGE",
                value: policy.recommend_min_average.to_string(),
                reason: "must be between 1 and 5".into(),
            });
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let rate_limit_per_minute = parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 1000u32)?;
        if rate_limit_per_minute == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_PER_MINUTE",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3001u16)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            seed_file: lookup("SEED_FILE").filter(|path| !path.is_empty()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?,
            jwt_secret,
            allowed_origins,
            rate_limit_per_minute,
            policy,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
