use indoc::formatdoc;
use poise::CreateReply;

use crate::commands::{caller_person, internal_err, user_err, CommandResult, Context};

/// Start a new team. Rename it with `/rename`.
#[poise::command(slash_command, rename = "create")]
pub async fn create(ctx: Context<'_>) -> CommandResult {
    let person = caller_person(ctx).await?;

    let team = ctx
        .data()
        .person_repository
        .create_own_team(person.id)
        .await
        .map_err(|err| internal_err(format!("Could not create the team: {err}")))?
        .ok_or_else(|| user_err("**You are no longer on the roster.**"))?;

    let message = formatdoc! {
        r#"
            **Created {team}.**

            Teammates join with `/team join` and your name. Pick a real name with `/rename`.
        "#,
        team = team.name,
    };
    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
