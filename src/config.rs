use std::env;
use std::num::NonZeroU32;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub riot_api_key: String,
    pub database_url: String,
    /// Channel receiving match alerts. Alerts are skipped entirely when unset.
    pub alert_channel_id: Option<u64>,
    pub polling_interval_secs: u64,
    /// How many recent match ids a poll cycle looks back over.
    pub lookback_count: u32,
    pub stats_default_days: u32,
    pub riot_rate_limit_per_minute: NonZeroU32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        const DEFAULT_POLLING_INTERVAL_SECS: u64 = 300;
        const DEFAULT_LOOKBACK_COUNT: u32 = 5;
        const DEFAULT_STATS_DAYS: u32 = 7;
        const DEFAULT_RIOT_RATE_LIMIT_PER_MINUTE: u32 = 100;

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_TOKEN must be set".into()))?;

        let riot_api_key = env::var("RIOT_API_KEY")
            .map_err(|_| AppError::Config("RIOT_API_KEY must be set".into()))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:riftwatch.db".into());

        let alert_channel_id = env::var("ALERT_CHANNEL_ID").ok().and_then(|v| v.parse().ok());

        let polling_interval_secs = env::var("POLLING_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLLING_INTERVAL_SECS);

        let lookback_count = env::var("LOOKBACK_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOOKBACK_COUNT);

        let stats_default_days = env::var("STATS_DEFAULT_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STATS_DAYS);

        let riot_rate_limit_per_minute = env::var("RIOT_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                NonZeroU32::new(DEFAULT_RIOT_RATE_LIMIT_PER_MINUTE).unwrap_or(NonZeroU32::MIN)
            });

        Ok(Self {
            discord_token,
            riot_api_key,
            database_url,
            alert_channel_id,
            polling_interval_secs,
            lookback_count,
            stats_default_days,
            riot_rate_limit_per_minute,
        })
    }
}
