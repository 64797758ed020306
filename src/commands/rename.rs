use poise::CreateReply;

use crate::{
    commands::{
        arguments::FreeText, caller_team, internal_err, user_err, CommandResult, Context,
    },
    repository::RenameOutcome,
};

/// Rename your team. Only possible before the first round starts.
#[poise::command(slash_command, rename = "rename")]
pub async fn rename(
    ctx: Context<'_>,
    #[description = "The new team name, up to 16 characters."] name: FreeText,
) -> CommandResult {
    let team = caller_team(ctx).await?;

    let outcome = ctx
        .data()
        .team_repository
        .rename(team.id, name.as_ref())
        .await
        .map_err(|err| internal_err(format!("Could not rename the team: {err}")))?;

    match outcome {
        RenameOutcome::Renamed(new_name) => {
            ctx.send(
                CreateReply::default()
                    .ephemeral(true)
                    .content(format!("**Your team is now called {new_name}.**")),
            )
            .await?;
            Ok(())
        }
        RenameOutcome::Refused => Err(user_err(
            "**The team can't be renamed.**\n\nNames are fixed once the first round starts or when the hosts lock them, and the name needs at least one letter or digit.",
        )),
    }
}
