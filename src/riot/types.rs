use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use thiserror::Error;

use crate::db::MatchRecord;

/// Failure kinds for calls against the upstream match-history API.
///
/// `MalformedPayload` is decode-level schema drift and is deliberately kept
/// apart from transport problems and from "the tracked player is not in this
/// match", which the poller reports on its own.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("resource not found upstream")]
    NotFound,

    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

/// A call to the Riot API either succeeds or fails with a [`SourceError`].
pub type SourceResult<T> = Result<T, SourceError>;

// ============================================================================
// Account-v1
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

// ============================================================================
// Match-v5
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub info: InfoDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    pub game_mode: String,
    /// Seconds.
    pub game_duration: i64,
    /// Epoch milliseconds.
    pub game_creation: i64,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_name: String,
    pub win: bool,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub total_minions_killed: i32,
    #[serde(default)]
    pub neutral_minions_killed: i32,
    #[serde(rename = "totalDamageDealtToChampions")]
    pub total_damage_dealt: i64,
    pub total_damage_taken: i64,
    pub vision_score: i32,
    pub gold_earned: i64,
    // Items (6 slots + ward)
    pub item0: i32,
    pub item1: i32,
    pub item2: i32,
    pub item3: i32,
    pub item4: i32,
    pub item5: i32,
    pub item6: i32,
}

impl ParticipantDto {
    pub fn cs_total(&self) -> i32 {
        self.total_minions_killed + self.neutral_minions_killed
    }

    /// All item IDs (0 = empty slot).
    pub fn items(&self) -> [i32; 7] {
        [
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5, self.item6,
        ]
    }
}

impl MatchDto {
    pub fn participant(&self, puuid: &str) -> Option<&ParticipantDto> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }

    /// Build the normalized per-player record out of this match payload.
    ///
    /// Returns `None` when `puuid` is not among the participants.
    pub fn extract_participant(&self, match_id: &str, puuid: &str) -> Option<MatchRecord> {
        let p = self.participant(puuid)?;

        let items = serde_json::to_string(&p.items()).unwrap_or_else(|_| "[]".into());

        Some(MatchRecord {
            match_id: match_id.to_string(),
            puuid: puuid.to_string(),
            champion: p.champion_name.clone(),
            game_mode: self.info.game_mode.clone(),
            game_duration: self.info.game_duration,
            win: p.win,
            kills: p.kills,
            deaths: p.deaths,
            assists: p.assists,
            creep_score: p.cs_total(),
            damage_dealt: p.total_damage_dealt,
            damage_taken: p.total_damage_taken,
            vision_score: p.vision_score,
            gold_earned: p.gold_earned,
            items,
            game_creation: self.info.game_creation,
            extracted_at: unix_time_secs(),
        })
    }
}

fn unix_time_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_match() -> MatchDto {
        let value = json!({
            "info": {
                "gameMode": "CLASSIC",
                "gameDuration": 1825,
                "gameCreation": 1_700_000_000_000_i64,
                "participants": [{
                    "puuid": "abc",
                    "championName": "Lux",
                    "win": true,
                    "kills": 5,
                    "deaths": 2,
                    "assists": 8,
                    "totalMinionsKilled": 180,
                    "neutralMinionsKilled": 12,
                    "totalDamageDealtToChampions": 21_500,
                    "totalDamageTaken": 14_200,
                    "visionScore": 31,
                    "goldEarned": 11_300,
                    "item0": 3020, "item1": 6655, "item2": 4645,
                    "item3": 3135, "item4": 0, "item5": 0, "item6": 3364
                }]
            }
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extract_participant_builds_record() {
        let m = sample_match();
        let record = m.extract_participant("NA1_123", "abc").unwrap();

        assert_eq!(record.match_id, "NA1_123");
        assert_eq!(record.champion, "Lux");
        assert!(record.win);
        assert_eq!(record.creep_score, 192);
        assert_eq!(record.damage_dealt, 21_500);
        assert_eq!(record.game_creation, 1_700_000_000_000);
        assert_eq!(
            record.items,
            "[3020,6655,4645,3135,0,0,3364]".to_string()
        );
        assert!(record.extracted_at > 0);
    }

    #[test]
    fn extract_participant_missing_puuid_is_none() {
        let m = sample_match();
        assert!(m.extract_participant("NA1_123", "someone-else").is_none());
    }

    #[test]
    fn decode_rejects_schema_drift() {
        // gameDuration as a string is a payload we refuse to half-read
        let res: Result<MatchDto, _> = serde_json::from_value(json!({
            "info": { "gameMode": "CLASSIC", "gameDuration": "long", "gameCreation": 0, "participants": [] }
        }));
        assert!(res.is_err());
    }
}
