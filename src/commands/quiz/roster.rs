use poise::{serenity_prelude::Attachment, CreateReply};

use crate::{
    commands::{internal_err, user_err, CommandResult, Context},
    models::RosterDefinition,
};

/// Replace the list of registered people from a JSON file.
#[poise::command(slash_command, rename = "roster")]
pub async fn roster(
    ctx: Context<'_>,
    #[description = "JSON with a `people` section."] file: Attachment,
) -> CommandResult {
    let payload = file
        .download()
        .await
        .map_err(|err| internal_err(format!("Could not download `{}`: {err}", file.filename)))?;

    let roster = RosterDefinition::parse(&payload)
        .map_err(|err| user_err(format!("**`{}` was not loaded.**\n\n{err}", file.filename)))?;

    let imported = ctx
        .data()
        .person_repository
        .import_roster(&roster)
        .await
        .map_err(|err| internal_err(format!("Could not store the roster: {err}")))?;

    let message = if roster.people.is_none() {
        format!("**`{}` has no `people` section, the roster is unchanged.**", file.filename)
    } else {
        format!("**Loaded {imported} people from `{}`.**", file.filename)
    };

    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
