use poise::serenity_prelude as serenity;
use tracing::{info, instrument, warn};

use crate::db::MatchStore;
use crate::discord::bot::Context;
use crate::error::AppError;
use crate::riot::{MatchSource, SourceError};

/// Start tracking a League of Legends player
#[poise::command(slash_command, guild_only)]
#[instrument(
    skip(ctx),
    fields(
        user_id = %ctx.author().id,
        riot_id = %format!("{}#{}", game_name, tag_line)
    )
)]
pub async fn track(
    ctx: Context<'_>,
    #[description = "Game name (before the #)"] game_name: String,
    #[description = "Tag line (after the #)"] tag_line: String,
) -> Result<(), AppError> {
    // Defer response since API calls might take a moment
    ctx.defer().await?;

    let account = ctx
        .data()
        .riot
        .get_account_by_riot_id(&game_name, &tag_line)
        .await
        .map_err(|e| match e {
            SourceError::NotFound => AppError::PlayerNotFound {
                game_name: game_name.clone(),
                tag_line: tag_line.clone(),
            },
            other => other.into(),
        })?;

    let actual_game_name = account.game_name.as_deref().unwrap_or(&game_name);
    let actual_tag_line = account.tag_line.as_deref().unwrap_or(&tag_line);

    let player = ctx
        .data()
        .db
        .upsert_player(&account.puuid, actual_game_name, actual_tag_line)
        .await?;

    // Seed the cursor from the current newest match so games played before
    // tracking are never replayed.
    if player.last_match_id.is_none() {
        match ctx.data().riot.get_match_ids(&account.puuid, 1).await {
            Ok(match_ids) => {
                if let Some(latest) = match_ids.first() {
                    ctx.data().db.set_last_match_id(&account.puuid, latest).await?;
                    info!(last_match_id = %latest, "Initialized player's cursor");
                }
            }
            Err(e) => {
                // Non-fatal: player might not have any matches yet
                warn!(error = %e, "Could not fetch last match id for new player");
            }
        }
    }

    let embed = serenity::CreateEmbed::new()
        .title("Player Tracked")
        .description(format!(
            "Now tracking **{}#{}**",
            actual_game_name, actual_tag_line
        ))
        .color(0x00ff00)
        .field("PUUID", &account.puuid[..8.min(account.puuid.len())], true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    info!("Player tracked successfully");

    Ok(())
}
