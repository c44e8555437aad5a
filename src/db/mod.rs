//! SQLite persistence for tracked players and their match history.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::error::AppError;

mod migrations;
mod models;

pub use models::{MatchRecord, TrackedPlayer};

const PLAYER_COLUMNS: &str = "puuid, game_name, tag_line, last_match_id, created_at, updated_at";

const RECORD_COLUMNS: &str = "match_id, puuid, champion, game_mode, game_duration, win, \
     kills, deaths, assists, creep_score, damage_dealt, damage_taken, vision_score, \
     gold_earned, items, game_creation, extracted_at";

/// Storage capability consumed by the poller.
///
/// Everything else the bot does with the database (riot-id lookups, removal)
/// lives as inherent methods on [`Repository`]; the poller only ever needs
/// these five operations.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get_all_tracked_players(&self) -> Result<Vec<TrackedPlayer>, AppError>;

    /// Insert or refresh a player by puuid. Display name and tag are
    /// replaced, the cursor is kept so re-tracking does not replay old games.
    async fn upsert_player(
        &self,
        puuid: &str,
        game_name: &str,
        tag_line: &str,
    ) -> Result<TrackedPlayer, AppError>;

    /// Advance the player's cursor. Single-row UPDATE, atomic with respect to
    /// concurrent readers of the same row.
    async fn set_last_match_id(&self, puuid: &str, match_id: &str) -> Result<(), AppError>;

    /// Insert one match record. A record already present for the same
    /// `(match_id, puuid)` pair is silently kept as-is.
    async fn insert_match_record(&self, record: &MatchRecord) -> Result<(), AppError>;

    /// Records for one player over a trailing window, newest game first.
    async fn get_matches_since(
        &self,
        puuid: &str,
        days: u32,
    ) -> Result<Vec<MatchRecord>, AppError>;
}

#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed), pool and migrate the database.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(AppError::Database)?
            .create_if_missing(true);

        // SQLite only has one writer, and a single pooled connection keeps
        // in-memory databases coherent across queries.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        migrations::run_migrations(&pool).await?;

        info!("🗄️ Database ready");
        Ok(Self::new(pool))
    }

    pub async fn get_player_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<TrackedPlayer>, AppError> {
        let player = sqlx::query_as::<_, TrackedPlayer>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM tracked_players \
             WHERE LOWER(game_name) = LOWER(?) AND LOWER(tag_line) = LOWER(?)"
        ))
        .bind(game_name)
        .bind(tag_line)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    pub async fn remove_player(&self, puuid: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tracked_players WHERE puuid = ?")
            .bind(puuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MatchStore for Repository {
    async fn get_all_tracked_players(&self) -> Result<Vec<TrackedPlayer>, AppError> {
        let players = sqlx::query_as::<_, TrackedPlayer>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM tracked_players ORDER BY game_name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    async fn upsert_player(
        &self,
        puuid: &str,
        game_name: &str,
        tag_line: &str,
    ) -> Result<TrackedPlayer, AppError> {
        let player = sqlx::query_as::<_, TrackedPlayer>(&format!(
            r#"
            INSERT INTO tracked_players (puuid, game_name, tag_line)
            VALUES (?, ?, ?)
            ON CONFLICT(puuid) DO UPDATE SET
                game_name = excluded.game_name,
                tag_line = excluded.tag_line,
                updated_at = unixepoch()
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(puuid)
        .bind(game_name)
        .bind(tag_line)
        .fetch_one(&self.pool)
        .await?;
        Ok(player)
    }

    async fn set_last_match_id(&self, puuid: &str, match_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tracked_players SET last_match_id = ?, updated_at = unixepoch() \
             WHERE puuid = ?",
        )
        .bind(match_id)
        .bind(puuid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_match_record(&self, record: &MatchRecord) -> Result<(), AppError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO match_records ({RECORD_COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(match_id, puuid) DO NOTHING
            "#
        ))
        .bind(&record.match_id)
        .bind(&record.puuid)
        .bind(&record.champion)
        .bind(&record.game_mode)
        .bind(record.game_duration)
        .bind(record.win)
        .bind(record.kills)
        .bind(record.deaths)
        .bind(record.assists)
        .bind(record.creep_score)
        .bind(record.damage_dealt)
        .bind(record.damage_taken)
        .bind(record.vision_score)
        .bind(record.gold_earned)
        .bind(&record.items)
        .bind(record.game_creation)
        .bind(record.extracted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_matches_since(
        &self,
        puuid: &str,
        days: u32,
    ) -> Result<Vec<MatchRecord>, AppError> {
        let cutoff_ms = unix_time_millis() - i64::from(days) * 86_400_000;

        let records = sqlx::query_as::<_, MatchRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM match_records \
             WHERE puuid = ? AND game_creation >= ? \
             ORDER BY game_creation DESC"
        ))
        .bind(puuid)
        .bind(cutoff_ms)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}

fn unix_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_repo() -> Repository {
        Repository::connect("sqlite::memory:").await.unwrap()
    }

    fn record(match_id: &str, puuid: &str, game_creation: i64) -> MatchRecord {
        MatchRecord {
            match_id: match_id.into(),
            puuid: puuid.into(),
            champion: "Lux".into(),
            game_mode: "CLASSIC".into(),
            game_duration: 1500,
            win: true,
            kills: 5,
            deaths: 2,
            assists: 8,
            creep_score: 190,
            damage_dealt: 20_000,
            damage_taken: 15_000,
            vision_score: 30,
            gold_earned: 11_000,
            items: "[3020,0,0,0,0,0,3364]".into(),
            game_creation,
            extracted_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_cursor_on_retrack() {
        let repo = test_repo().await;

        repo.upsert_player("p1", "Foo", "NA1").await.unwrap();
        repo.set_last_match_id("p1", "NA1_42").await.unwrap();

        // Re-track with a new display name must not reset the cursor
        let player = repo.upsert_player("p1", "FooRenamed", "NA1").await.unwrap();

        assert_eq!(player.game_name, "FooRenamed");
        assert_eq!(player.last_match_id.as_deref(), Some("NA1_42"));

        let all = repo.get_all_tracked_players().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_match_record_is_a_noop() {
        let repo = test_repo().await;
        repo.upsert_player("p1", "Foo", "NA1").await.unwrap();

        let rec = record("NA1_42", "p1", unix_time_millis());
        repo.insert_match_record(&rec).await.unwrap();
        repo.insert_match_record(&rec).await.unwrap();

        let stored = repo.get_matches_since("p1", 7).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].match_id, "NA1_42");
    }

    #[tokio::test]
    async fn same_match_for_two_players_is_two_rows() {
        let repo = test_repo().await;
        let now = unix_time_millis();

        repo.insert_match_record(&record("NA1_42", "p1", now))
            .await
            .unwrap();
        repo.insert_match_record(&record("NA1_42", "p2", now))
            .await
            .unwrap();

        assert_eq!(repo.get_matches_since("p1", 7).await.unwrap().len(), 1);
        assert_eq!(repo.get_matches_since("p2", 7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn matches_since_filters_and_orders_newest_first() {
        let repo = test_repo().await;
        let now = unix_time_millis();

        repo.insert_match_record(&record("NA1_1", "p1", now - 10 * 86_400_000))
            .await
            .unwrap();
        repo.insert_match_record(&record("NA1_2", "p1", now - 86_400_000))
            .await
            .unwrap();
        repo.insert_match_record(&record("NA1_3", "p1", now))
            .await
            .unwrap();

        let recent = repo.get_matches_since("p1", 7).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.match_id.as_str()).collect();
        assert_eq!(ids, vec!["NA1_3", "NA1_2"]);
    }

    #[tokio::test]
    async fn riot_id_lookup_is_case_insensitive() {
        let repo = test_repo().await;
        repo.upsert_player("p1", "Foo", "NA1").await.unwrap();

        let found = repo.get_player_by_riot_id("foo", "na1").await.unwrap();
        assert_eq!(found.unwrap().puuid, "p1");

        assert!(repo
            .get_player_by_riot_id("Bar", "NA1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn remove_player_reports_whether_it_existed() {
        let repo = test_repo().await;
        repo.upsert_player("p1", "Foo", "NA1").await.unwrap();

        assert!(repo.remove_player("p1").await.unwrap());
        assert!(!repo.remove_player("p1").await.unwrap());
        assert!(repo.get_all_tracked_players().await.unwrap().is_empty());
    }
}
