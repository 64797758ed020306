use poise::CreateReply;

use crate::commands::{caller_person, internal_err, user_err, CommandResult, Context};

/// Leave your current team.
#[poise::command(slash_command, rename = "leave")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let person = caller_person(ctx).await?;

    let left = ctx
        .data()
        .person_repository
        .leave_team(person.id)
        .await
        .map_err(|err| internal_err(format!("Could not leave the team: {err}")))?;

    if !left {
        return Err(user_err("**You are not on a team.**"));
    }

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content("**You left your team.**"),
    )
    .await?;

    Ok(())
}
