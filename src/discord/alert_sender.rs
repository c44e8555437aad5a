//! Delivery of match alerts to the configured Discord channel.

use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, CreateMessage, Http};
use tracing::debug;

use crate::db::{MatchRecord, TrackedPlayer};
use crate::error::AppError;

use super::embeds;

/// Outbound notification capability used by the poller.
///
/// Delivery is best effort: the poller logs a failure and moves on.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_match_alert(
        &self,
        player: &TrackedPlayer,
        record: &MatchRecord,
    ) -> Result<(), AppError>;
}

/// [`AlertSink`] posting an embed to a single configured channel.
#[derive(Clone)]
pub struct DiscordAlertSink {
    http: Arc<Http>,
    channel_id: Option<ChannelId>,
}

impl DiscordAlertSink {
    pub fn new(http: Arc<Http>, channel_id: Option<u64>) -> Self {
        Self {
            http,
            channel_id: channel_id.map(ChannelId::new),
        }
    }
}

#[async_trait]
impl AlertSink for DiscordAlertSink {
    async fn send_match_alert(
        &self,
        player: &TrackedPlayer,
        record: &MatchRecord,
    ) -> Result<(), AppError> {
        let Some(channel_id) = self.channel_id else {
            debug!("no alert channel configured, skipping alert");
            return Ok(());
        };

        let embed = embeds::match_summary(player, record);
        channel_id
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;

        debug!(
            riot_id = %player.riot_id(),
            match_id = %record.match_id,
            "🎮 ✅ Alert sent"
        );
        Ok(())
    }
}
