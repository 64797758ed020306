use std::collections::HashMap;

use poise::CreateReply;

use crate::{
    commands::{arguments::RoundAction, internal_err, user_err, CommandResult, Context},
    models::{types::UtcDateTime, RoundId},
    repository::TransitionOutcome,
    utils::formatting::{fit_message, format_ranking},
};

/// Start, finish, reopen or rescore a round.
#[poise::command(slash_command, rename = "round")]
pub async fn round(
    ctx: Context<'_>,
    #[description = "The round number."] round: i64,
    #[description = "What to do with the round."] action: RoundAction,
) -> CommandResult {
    let data = ctx.data();
    let round_id = RoundId(round);

    let outcome = match action {
        RoundAction::Start => {
            data.round_repository
                .start_round(round_id, UtcDateTime::now())
                .await
        }
        RoundAction::Finish => data.round_repository.finish_round(round_id).await,
        RoundAction::Reopen => data.round_repository.reopen_round(round_id).await,
        RoundAction::Rescore => data.round_repository.rescore_round(round_id).await,
    }
    .map_err(|err| internal_err(format!("Round {round} could not change: {err}")))?;

    let name = data
        .round_repository
        .get_round(round_id)
        .await
        .ok()
        .flatten()
        .map(|round| round.name)
        .unwrap_or_else(|| format!("Round {round}"));

    let message = match outcome {
        TransitionOutcome::Started => format!("**{name} started.**"),
        TransitionOutcome::Reopened => format!("**{name} is pending again.**"),
        TransitionOutcome::Finished(outcome) | TransitionOutcome::Rescored(outcome) => {
            let team_names: HashMap<_, _> = data
                .team_repository
                .all_teams()
                .await
                .map_err(|err| internal_err(format!("Could not load the teams: {err}")))?
                .into_iter()
                .map(|team| (team.id, team.name))
                .collect();

            let verb = if action == RoundAction::Rescore {
                "rescored"
            } else {
                "finished"
            };

            format!(
                "# {name} {verb}\n{} eligible teams, the top {} score.\n{}",
                outcome.eligible_teams,
                outcome.cutoff,
                format_ranking(&outcome, &team_names, true)
            )
        }
        TransitionOutcome::Rejected(reason) => {
            return Err(user_err(format!("**{name}: {reason}.**")));
        }
    };

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content(fit_message(&message)),
    )
    .await?;

    Ok(())
}
