use indoc::formatdoc;
use poise::CreateReply;

use crate::{
    commands::{caller_person, internal_err, user_err, CommandResult, Context},
    models::Preference,
};

#[poise::command(slash_command, subcommands("register_random", "register_self"))]
pub async fn register(_ctx: Context<'_>) -> CommandResult {
    Err(user_err("Use `/register random` or `/register self`"))
}

/// Let the hosts place you into a random team.
#[poise::command(slash_command, rename = "random")]
pub async fn register_random(ctx: Context<'_>) -> CommandResult {
    set_preference(ctx, Preference::Random).await
}

/// Organize your own team with `/team create` and `/team join`.
#[poise::command(slash_command, rename = "self")]
pub async fn register_self(ctx: Context<'_>) -> CommandResult {
    set_preference(ctx, Preference::SelfOrganized).await
}

async fn set_preference(ctx: Context<'_>, preference: Preference) -> CommandResult {
    let person = caller_person(ctx).await?;

    ctx.data()
        .person_repository
        .set_preference(person.id, preference)
        .await
        .map_err(|err| internal_err(format!("Could not save the preference: {err}")))?;

    let message = match preference {
        Preference::Random => formatdoc! {
            r#"
                **You're in the draw, {name}.**

                Teams are formed shortly before the quiz. You'll see yours with `/team show` once the hosts publish them.
            "#,
            name = person.name,
        },
        Preference::SelfOrganized => formatdoc! {
            r#"
                **You're organizing your own team, {name}.**

                Start one with `/team create` or join a friend with `/team join`.
            "#,
            name = person.name,
        },
    };

    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
