use poise::serenity_prelude as serenity;

use crate::db::MatchStore;
use crate::discord::bot::Context;
use crate::error::AppError;

/// List all tracked players
#[poise::command(slash_command, guild_only)]
pub async fn tracked(ctx: Context<'_>) -> Result<(), AppError> {
    let players = ctx.data().db.get_all_tracked_players().await?;

    if players.is_empty() {
        ctx.say("No players are being tracked.\nUse `/track` to add players.")
            .await?;
        return Ok(());
    }

    let mut description = String::new();
    for player in &players {
        description.push_str(&format!("- **{}**\n", player.riot_id()));
    }

    let embed = serenity::CreateEmbed::new()
        .title(format!("Tracked Players ({})", players.len()))
        .description(description)
        .color(0x0099ff);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
