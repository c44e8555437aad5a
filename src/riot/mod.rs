//! Client and typed payloads for the upstream match-history API.

use async_trait::async_trait;

mod client;
mod metrics;
pub mod types;

pub use client::RiotClient;
pub use types::{AccountDto, MatchDto, SourceError, SourceResult};

/// Upstream capability consumed by the poller and the command surface.
///
/// All fetches go through here so the poller can be exercised against an
/// in-memory source in tests.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Resolve a riot id (`name#tag`) to the stable account key (puuid).
    async fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> SourceResult<AccountDto>;

    /// The `count` most recent match ids for an account, newest first.
    /// An empty list is valid (brand-new account).
    async fn get_match_ids(&self, puuid: &str, count: u32) -> SourceResult<Vec<String>>;

    async fn get_match(&self, match_id: &str) -> SourceResult<MatchDto>;
}
