use sqlx::FromRow;

/// A player the bot polls for new match results.
#[derive(Debug, Clone, FromRow)]
pub struct TrackedPlayer {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    /// Most recently processed match id, `None` until the first poll or seed.
    /// Only ever moves forward, to a match newer than the previous value.
    pub last_match_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TrackedPlayer {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// One player's normalized result for one completed match.
///
/// Append-only: rows are written once by the poller and never mutated.
#[derive(Debug, Clone, FromRow)]
pub struct MatchRecord {
    pub match_id: String,
    pub puuid: String,
    pub champion: String,
    pub game_mode: String,
    /// Seconds.
    pub game_duration: i64,
    pub win: bool,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub creep_score: i32,
    pub damage_dealt: i64,
    pub damage_taken: i64,
    pub vision_score: i32,
    pub gold_earned: i64,
    /// JSON array of item ids (0 = empty slot).
    pub items: String,
    /// In-game creation time, epoch milliseconds.
    pub game_creation: i64,
    /// When this system processed the match, epoch seconds.
    pub extracted_at: i64,
}

impl MatchRecord {
    pub fn kda_ratio(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }

    pub fn duration_formatted(&self) -> String {
        let minutes = self.game_duration / 60;
        let seconds = self.game_duration % 60;
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kills: i32, deaths: i32, assists: i32) -> MatchRecord {
        MatchRecord {
            match_id: "NA1_1".into(),
            puuid: "p".into(),
            champion: "Lux".into(),
            game_mode: "CLASSIC".into(),
            game_duration: 1825,
            win: true,
            kills,
            deaths,
            assists,
            creep_score: 190,
            damage_dealt: 20_000,
            damage_taken: 15_000,
            vision_score: 30,
            gold_earned: 11_000,
            items: "[]".into(),
            game_creation: 0,
            extracted_at: 0,
        }
    }

    #[test]
    fn kda_treats_zero_deaths_as_one() {
        assert_eq!(record(4, 0, 6).kda_ratio(), 10.0);
        assert_eq!(record(4, 2, 6).kda_ratio(), 5.0);
    }

    #[test]
    fn duration_is_minutes_and_seconds() {
        assert_eq!(record(0, 0, 0).duration_formatted(), "30:25");
    }
}
