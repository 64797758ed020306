use poise::CreateReply;

use crate::{
    commands::{internal_err, CommandResult, Context},
    utils::formatting::{fit_message, format_points, format_utc_time},
};

/// Every answer submitted in the running round, oldest first.
#[poise::command(slash_command, rename = "progress")]
pub async fn progress(ctx: Context<'_>) -> CommandResult {
    let entries = ctx
        .data()
        .guess_repository
        .round_progress()
        .await
        .map_err(|err| internal_err(format!("Could not load the progress: {err}")))?;

    let content = if entries.is_empty() {
        "# No answers yet\nEither no round is running or nobody has answered.".to_string()
    } else {
        entries.iter().fold(
            format!("# {} answers\n", entries.len()),
            |acc, entry| {
                acc + &format!(
                    "{} **{}** `{}` {} ({})\n",
                    format_utc_time(entry.submitted_at),
                    entry.team_name,
                    entry.letter,
                    entry.answered,
                    format_points(entry.points)
                )
            },
        )
    };

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content(fit_message(&content)),
    )
    .await?;

    Ok(())
}
