use poise::CreateReply;

use crate::commands::{internal_err, CommandResult, Context};

/// Let people see the teams they were placed into.
#[poise::command(slash_command, rename = "publish")]
pub async fn publish(
    ctx: Context<'_>,
    #[description = "Whether `/team show` works."] published: bool,
) -> CommandResult {
    ctx.data()
        .person_repository
        .set_teams_published(published)
        .await
        .map_err(|err| internal_err(format!("Could not change the flag: {err}")))?;

    let message = if published {
        "**Teams are published.**"
    } else {
        "**Teams are hidden.**"
    };
    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
