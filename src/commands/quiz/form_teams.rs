use indoc::formatdoc;
use poise::CreateReply;

use crate::commands::{internal_err, CommandResult, Context};

/// Place everyone waiting for a random team.
#[poise::command(slash_command, rename = "form_teams")]
pub async fn form_teams(
    ctx: Context<'_>,
    #[description = "Seed for a reproducible draw. Random by default."] seed: Option<u64>,
) -> CommandResult {
    let seed = seed.unwrap_or_else(rand::random);

    let report = ctx
        .data()
        .formation_repository
        .form_random_teams(seed)
        .await
        .map_err(|err| internal_err(format!("Teams were not formed: {err}")))?;

    let message = formatdoc! {
        r#"
            **Teams formed** (seed `{seed}`).

            People placed: {assigned}
            Counted in another group: {regrouped}
            Teams created: {created}
            Empty teams removed: {removed}

            Publish them with `/quiz publish true` when ready.
        "#,
        assigned = report.assigned,
        regrouped = report.regrouped,
        created = report.teams_created,
        removed = report.teams_removed,
    };

    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
