use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, warn};

use crate::db::{MatchStore, TrackedPlayer};
use crate::discord::alert_sender::AlertSink;
use crate::error::AppError;
use crate::riot::{MatchSource, SourceError};

/// How many players a single cycle checks concurrently.
const MAX_CONCURRENT_PLAYERS: usize = 10;

#[derive(Debug, thiserror::Error)]
enum PollerError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Player {puuid} not found in match {match_id}")]
    PlayerNotFoundInMatch { puuid: String, match_id: String },
}

/// Counts describing what one poll cycle actually did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub players_polled: usize,
    pub players_up_to_date: usize,
    pub players_failed: usize,
    pub matches_recorded: usize,
    pub matches_skipped: usize,
}

enum PlayerOutcome {
    UpToDate,
    CaughtUp { recorded: usize, skipped: usize },
}

/// Periodically fetches recent match ids for every tracked player, records
/// matches that appeared since the player's cursor and pushes out an alert
/// for each.
pub struct MatchPoller<A, C, N> {
    source: Arc<A>,
    db: C,
    sink: N,
    poll_interval: Duration,
    /// How many recent match ids one check looks back over. Anything that
    /// slipped further into the past than this window is not backfilled.
    lookback: u32,
}

impl<A, C, N> MatchPoller<A, C, N>
where
    A: MatchSource + 'static,
    C: MatchStore + 'static,
    N: AlertSink + 'static,
{
    pub fn new(source: Arc<A>, db: C, sink: N, poll_interval: Duration, lookback: u32) -> Self {
        Self {
            source,
            db,
            sink,
            poll_interval,
            lookback,
        }
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.poll_interval.as_secs(),
                lookback = self.lookback,
                "🔄 Match poller started"
            );

            let mut interval = interval(self.poll_interval);
            // A long cycle delays the next tick; cycles never run concurrently.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                match self.run_cycle().await {
                    Ok(outcome) => info!(
                        players = outcome.players_polled,
                        up_to_date = outcome.players_up_to_date,
                        failed = outcome.players_failed,
                        recorded = outcome.matches_recorded,
                        skipped = outcome.matches_skipped,
                        "🔄 Poll cycle complete"
                    ),
                    Err(e) => error!(error = ?e, "🔄 ❌ Poll cycle failed"),
                }
            }
        })
    }

    /// Run one reconciliation pass over every tracked player.
    ///
    /// Failing to list the players aborts the whole cycle with no side
    /// effects; any later failure stays confined to the player (or the single
    /// match) it happened for.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, AppError> {
        let players = self.db.get_all_tracked_players().await?;

        if players.is_empty() {
            debug!("🔄 No players tracked, skipping poll cycle");
            return Ok(CycleOutcome::default());
        }

        let players_polled = players.len();
        let checks = players
            .into_iter()
            .map(|player| async move { self.check_player_logged(&player).await });
        let results = stream::iter(checks)
            .buffer_unordered(MAX_CONCURRENT_PLAYERS)
            .collect::<Vec<_>>()
            .await;

        let mut outcome = CycleOutcome {
            players_polled,
            ..CycleOutcome::default()
        };
        for res in results {
            match res {
                Ok(PlayerOutcome::UpToDate) => outcome.players_up_to_date += 1,
                Ok(PlayerOutcome::CaughtUp { recorded, skipped }) => {
                    outcome.matches_recorded += recorded;
                    outcome.matches_skipped += skipped;
                }
                Err(_) => outcome.players_failed += 1,
            }
        }

        Ok(outcome)
    }

    /// Thin wrapper over [`Self::check_player`] that logs a warning on failure.
    async fn check_player_logged(
        &self,
        player: &TrackedPlayer,
    ) -> Result<PlayerOutcome, PollerError> {
        let res = self.check_player(player).await;
        if let Err(e) = &res {
            warn!(
                riot_id = %player.riot_id(),
                error = %e,
                "🔄 ⚠️ Failed to check player"
            );
        }
        res
    }

    #[instrument(skip_all, fields(riot_id = %player.riot_id()))]
    async fn check_player(&self, player: &TrackedPlayer) -> Result<PlayerOutcome, PollerError> {
        let ids = self
            .source
            .get_match_ids(&player.puuid, self.lookback)
            .await?;

        let Some(newest) = ids.first().cloned() else {
            debug!("🔄 No matches found");
            return Ok(PlayerOutcome::UpToDate);
        };

        if player.last_match_id.as_deref() == Some(newest.as_str()) {
            return Ok(PlayerOutcome::UpToDate);
        }

        let pending = new_match_ids(&ids, player.last_match_id.as_deref());
        info!(count = pending.len(), "🔄 ✅ New match(es) detected");

        // Oldest first, so records and alerts land in chronological order.
        let mut recorded = 0;
        let mut skipped = 0;
        for match_id in pending.iter().rev() {
            match self.process_match(player, match_id).await {
                Ok(()) => recorded += 1,
                Err(e) => {
                    warn!(match_id, error = %e, "🔄 ⚠️ Skipping match");
                    skipped += 1;
                }
            }
        }

        // The cursor moves once per batch, to the newest fetched id. A crash
        // above leaves it untouched and the window is replayed next cycle;
        // duplicate inserts are absorbed by the store.
        self.db.set_last_match_id(&player.puuid, &newest).await?;

        Ok(PlayerOutcome::CaughtUp { recorded, skipped })
    }

    async fn process_match(
        &self,
        player: &TrackedPlayer,
        match_id: &str,
    ) -> Result<(), PollerError> {
        let match_data = self.source.get_match(match_id).await?;

        let record = match_data
            .extract_participant(match_id, &player.puuid)
            .ok_or_else(|| PollerError::PlayerNotFoundInMatch {
                puuid: player.puuid.clone(),
                match_id: match_id.to_string(),
            })?;

        self.db.insert_match_record(&record).await?;

        // Best effort only: a failed alert never holds back the batch.
        if let Err(e) = self.sink.send_match_alert(player, &record).await {
            warn!(match_id, error = %e, "🎮 ❌ Failed to send alert");
        }

        Ok(())
    }
}

/// Ids newer than the cursor, in the source's newest-first order.
///
/// The scan stops on cursor id equality; a cursor that is absent from the
/// window (fell out of it, or was never set) means the whole window is new.
fn new_match_ids<'a>(ids: &'a [String], cursor: Option<&str>) -> Vec<&'a str> {
    let mut fresh = Vec::new();
    for id in ids {
        if Some(id.as_str()) == cursor {
            break;
        }
        fresh.push(id.as_str());
    }
    fresh
}
