use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::info;

use riftwatch::config::Config;
use riftwatch::db::Repository;
use riftwatch::discord::{Data, DiscordAlertSink, create_framework};
use riftwatch::error::AppError;
use riftwatch::poller::MatchPoller;
use riftwatch::riot::RiotClient;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    riftwatch::logging::init();

    let config = Config::from_env()?;

    info!("🔭 Starting...");

    let db = Repository::connect(&config.database_url).await?;

    let riot = Arc::new(RiotClient::new(
        config.riot_api_key.clone(),
        config.riot_rate_limit_per_minute,
    ));
    riot.start_metrics_logging();

    let framework = create_framework(Data {
        db: db.clone(),
        riot: riot.clone(),
        stats_default_days: config.stats_default_days,
    });

    let mut client = serenity::ClientBuilder::new(
        &config.discord_token,
        serenity::GatewayIntents::non_privileged(),
    )
    .framework(framework)
    .await?;

    let sink = DiscordAlertSink::new(client.http.clone(), config.alert_channel_id);
    let poller = MatchPoller::new(
        riot,
        db,
        sink,
        Duration::from_secs(config.polling_interval_secs),
        config.lookback_count,
    );
    poller.start();

    client.start().await?;

    Ok(())
}
