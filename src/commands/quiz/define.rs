use indoc::formatdoc;
use poise::{serenity_prelude::Attachment, CreateReply};
use tracing::info;

use crate::{
    commands::{internal_err, user_err, CommandResult, Context},
    models::ContestDefinition,
};

/// Load teams, rounds and questions from a JSON file. Wipes all answers.
#[poise::command(slash_command, rename = "define")]
pub async fn define(
    ctx: Context<'_>,
    #[description = "JSON with optional `teams`, `rounds` and `questions` sections."]
    file: Attachment,
) -> CommandResult {
    let payload = file
        .download()
        .await
        .map_err(|err| internal_err(format!("Could not download `{}`: {err}", file.filename)))?;

    let definition = ContestDefinition::parse(&payload)
        .map_err(|err| user_err(format!("**`{}` was not loaded.**\n\n{err}", file.filename)))?;

    ctx.data()
        .round_repository
        .import_definition(&definition)
        .await
        .map_err(|err| internal_err(format!("Could not store the contest: {err}")))?;

    info!("Contest definition loaded from {}", file.filename);

    let count = |section: Option<usize>| match section {
        Some(n) => n.to_string(),
        None => "unchanged".to_string(),
    };
    let message = formatdoc! {
        r#"
            **Loaded `{filename}`.**

            Teams: {teams}
            Rounds: {rounds}
            Questions: {questions}

            All answers and round results were cleared.
        "#,
        filename = file.filename,
        teams = count(definition.teams.as_ref().map(Vec::len)),
        rounds = count(definition.rounds.as_ref().map(Vec::len)),
        questions = count(definition.questions.as_ref().map(Vec::len)),
    };

    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
