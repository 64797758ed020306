use poise::CreateReply;

use crate::{
    commands::{caller_team, internal_err, user_err, CommandResult, Context},
    models::Round,
    repository::ReviewedAnswer,
    utils::formatting::{fit_message, format_points},
};

/// Review the answers that counted in the last finished round.
#[poise::command(slash_command, rename = "answers")]
pub async fn answers(ctx: Context<'_>) -> CommandResult {
    let team = caller_team(ctx).await?;
    let scope = (!team.is_admin).then_some(team.id);

    let review = ctx
        .data()
        .guess_repository
        .reviewed_answers(scope)
        .await
        .map_err(|err| internal_err(format!("Could not load the answers: {err}")))?;

    let Some((round, answers)) = review else {
        return Err(user_err(
            "**Nothing to review yet.**\n\nAnswers can be reviewed after a round finishes and before the next one starts.",
        ));
    };

    let content = render_review(&round, &answers, team.is_admin);
    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content(fit_message(&content)),
    )
    .await?;

    Ok(())
}

fn render_review(round: &Round, answers: &[ReviewedAnswer], with_team_names: bool) -> String {
    let mut content = format!(
        "# {}\nEach question was worth {} before hints.\n",
        round.name, round.base_value
    );

    if answers.is_empty() {
        content += "No answers were counted.\n";
        return content;
    }

    let mut current_team = None;
    for answer in answers {
        if with_team_names && current_team != Some(answer.team_id) {
            content += &format!("**{}**\n", answer.team_name);
            current_team = Some(answer.team_id);
        }
        content += &format!(
            " - `{}` {} ({})\n",
            answer.letter,
            answer.answered,
            format_points(answer.points)
        );
    }

    content
}
