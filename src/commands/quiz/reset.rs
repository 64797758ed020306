use poise::CreateReply;
use tracing::warn;

use crate::commands::{internal_err, user_err, CommandResult, Context};

/// Clear every answer and result and put all rounds back to pending.
#[poise::command(slash_command, rename = "reset")]
pub async fn reset(
    ctx: Context<'_>,
    #[description = "Must be true. There is no undo."] confirm: bool,
) -> CommandResult {
    if !confirm {
        return Err(user_err("**Nothing was reset.**"));
    }

    warn!("Contest reset requested by {}", ctx.author().name);

    ctx.data()
        .round_repository
        .reset_contest()
        .await
        .map_err(|err| internal_err(format!("The contest was not reset: {err}")))?;

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content("**The contest was reset.** All rounds are pending."),
    )
    .await?;

    Ok(())
}
