use poise::serenity_prelude as serenity;
use tracing::instrument;

use crate::db::{MatchRecord, MatchStore};
use crate::discord::bot::Context;
use crate::error::AppError;

/// Show a player's aggregate stats over a trailing window
#[poise::command(slash_command, guild_only)]
#[instrument(
    skip(ctx),
    fields(riot_id = %format!("{}#{}", game_name, tag_line))
)]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "Game name (before the #)"] game_name: String,
    #[description = "Tag line (after the #)"] tag_line: String,
    #[description = "Trailing window in days"] days: Option<u32>,
) -> Result<(), AppError> {
    let days = days.unwrap_or(ctx.data().stats_default_days);

    let player = ctx
        .data()
        .db
        .get_player_by_riot_id(&game_name, &tag_line)
        .await?
        .ok_or(AppError::PlayerNotFound {
            game_name: game_name.clone(),
            tag_line: tag_line.clone(),
        })?;

    let records = ctx.data().db.get_matches_since(&player.puuid, days).await?;

    if records.is_empty() {
        ctx.say(format!(
            "No matches recorded for **{}** in the last {} day(s).",
            player.riot_id(),
            days
        ))
        .await?;
        return Ok(());
    }

    let summary = StatsSummary::from_records(&records);

    let embed = serenity::CreateEmbed::new()
        .title(format!("📈 {} — last {} day(s)", player.riot_id(), days))
        .color(0x0099ff)
        .field("Games", summary.games.to_string(), true)
        .field(
            "W / L",
            format!("{} / {}", summary.wins, summary.losses),
            true,
        )
        .field("Win Rate", format!("{:.0}%", summary.win_rate * 100.0), true)
        .field(
            "Avg KDA",
            format!(
                "{:.1}/{:.1}/{:.1} ({:.2})",
                summary.avg_kills, summary.avg_deaths, summary.avg_assists, summary.kda_ratio
            ),
            true,
        )
        .field("Avg CS", format!("{:.0}", summary.avg_creep_score), true)
        .field("Avg Damage", format!("{:.0}", summary.avg_damage_dealt), true)
        .field("Avg Vision", format!("{:.1}", summary.avg_vision_score), true)
        .field("Avg Gold", format!("{:.0}", summary.avg_gold_earned), true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Aggregates over a set of match records.
#[derive(Debug, PartialEq)]
struct StatsSummary {
    games: usize,
    wins: usize,
    losses: usize,
    win_rate: f64,
    avg_kills: f64,
    avg_deaths: f64,
    avg_assists: f64,
    kda_ratio: f64,
    avg_creep_score: f64,
    avg_damage_dealt: f64,
    avg_vision_score: f64,
    avg_gold_earned: f64,
}

impl StatsSummary {
    fn from_records(records: &[MatchRecord]) -> Self {
        let games = records.len();
        let wins = records.iter().filter(|r| r.win).count();

        let sum = |f: fn(&MatchRecord) -> f64| -> f64 { records.iter().map(f).sum() };
        let avg = |f: fn(&MatchRecord) -> f64| -> f64 { sum(f) / games.max(1) as f64 };

        let total_kills = sum(|r| f64::from(r.kills));
        let total_deaths = sum(|r| f64::from(r.deaths));
        let total_assists = sum(|r| f64::from(r.assists));

        Self {
            games,
            wins,
            losses: games - wins,
            win_rate: wins as f64 / games.max(1) as f64,
            avg_kills: total_kills / games.max(1) as f64,
            avg_deaths: total_deaths / games.max(1) as f64,
            avg_assists: total_assists / games.max(1) as f64,
            kda_ratio: (total_kills + total_assists) / total_deaths.max(1.0),
            avg_creep_score: avg(|r| f64::from(r.creep_score)),
            avg_damage_dealt: avg(|r| r.damage_dealt as f64),
            avg_vision_score: avg(|r| f64::from(r.vision_score)),
            avg_gold_earned: avg(|r| r.gold_earned as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(win: bool, kills: i32, deaths: i32, assists: i32) -> MatchRecord {
        MatchRecord {
            match_id: "NA1_1".into(),
            puuid: "p".into(),
            champion: "Lux".into(),
            game_mode: "CLASSIC".into(),
            game_duration: 1500,
            win,
            kills,
            deaths,
            assists,
            creep_score: 200,
            damage_dealt: 20_000,
            damage_taken: 15_000,
            vision_score: 30,
            gold_earned: 10_000,
            items: "[]".into(),
            game_creation: 0,
            extracted_at: 0,
        }
    }

    #[test]
    fn aggregates_over_all_records() {
        let records = vec![
            record(true, 10, 2, 6),
            record(false, 2, 8, 4),
            record(true, 6, 0, 8),
        ];

        let summary = StatsSummary::from_records(&records);

        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 1);
        assert!((summary.win_rate - 2.0 / 3.0).abs() < f64::EPSILON);
        assert!((summary.avg_kills - 6.0).abs() < f64::EPSILON);
        assert!((summary.kda_ratio - 3.6).abs() < f64::EPSILON);
        assert!((summary.avg_creep_score - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_total_deaths_does_not_divide_by_zero() {
        let summary = StatsSummary::from_records(&[record(true, 4, 0, 6)]);
        assert!((summary.kda_ratio - 10.0).abs() < f64::EPSILON);
    }
}
