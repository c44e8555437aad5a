//! Embed layouts for outgoing messages.

use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter};

use crate::db::{MatchRecord, TrackedPlayer};

const WIN_COLOUR: u32 = 0x00ff00;
const LOSS_COLOUR: u32 = 0xff0000;

/// One-match summary posted to the alert channel.
pub fn match_summary(player: &TrackedPlayer, record: &MatchRecord) -> CreateEmbed {
    let (result, colour) = if record.win {
        ("🟢 Win", WIN_COLOUR)
    } else {
        ("🔴 Loss", LOSS_COLOUR)
    };

    CreateEmbed::new()
        .title(format!("🎮 New Game Detected — {}", player.riot_id()))
        .color(colour)
        .field("Result", result, true)
        .field("Champion", record.champion.clone(), true)
        .field(
            "KDA",
            format!(
                "{}/{}/{} ({:.2})",
                record.kills,
                record.deaths,
                record.assists,
                record.kda_ratio()
            ),
            true,
        )
        .field("CS", record.creep_score.to_string(), true)
        .field("Damage", record.damage_dealt.to_string(), true)
        .field("Vision Score", record.vision_score.to_string(), true)
        .field("Game Mode", game_mode_display(&record.game_mode), true)
        .field("Duration", record.duration_formatted(), true)
        .field("Gold Earned", record.gold_earned.to_string(), true)
        .footer(CreateEmbedFooter::new(format!(
            "Match ID: {}",
            record.match_id
        )))
}

/// `CHERRY_2V2` -> `Cherry 2v2`
fn game_mode_display(mode: &str) -> String {
    mode.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
