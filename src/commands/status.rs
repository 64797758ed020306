use std::collections::HashMap;

use poise::CreateReply;
use tracing::warn;

use crate::{
    commands::{caller_team, internal_err, CommandResult, Context},
    engine::{
        hint_schedule::{Disclosure, HintSchedule},
        leaderboard::Standing,
    },
    models::{types::UtcDateTime, Content, GuessAction, Question, Round, RoundId, RoundState, Team},
    utils::{
        formatting::{fit_message, format_points, format_utc_time},
        timestamp, TimestampStyle,
    },
};

/// Everything one team may see at one instant.
struct StatusView<'a> {
    team: &'a Team,
    rounds: &'a [Round],
    standings: &'a [Standing],
    history: &'a [GuessAction],
    /// The round on display and its questions, hints already filtered.
    current: Option<(&'a Round, Vec<Question>)>,
    now: UtcDateTime,
}

/// Show the running round, its questions and the leaderboard.
#[poise::command(slash_command, rename = "status")]
pub async fn status(ctx: Context<'_>) -> CommandResult {
    let team = caller_team(ctx).await?;
    let now = UtcDateTime::now();
    let data = ctx.data();

    if let Err(err) = data.team_repository.touch_last_seen(team.id, now).await {
        warn!("Could not update last seen of team {}: {err}", team.id.0);
    }

    let rounds = data
        .round_repository
        .list_rounds()
        .await
        .map_err(|err| internal_err(format!("Could not load rounds: {err}")))?;

    let standings = data
        .team_repository
        .leaderboard()
        .await
        .map_err(|err| internal_err(format!("Could not load the leaderboard: {err}")))?
        .standings();

    let history = data
        .guess_repository
        .team_history(team.id)
        .await
        .map_err(|err| internal_err(format!("Could not load your answers: {err}")))?;

    let current_round = data
        .round_repository
        .current_question_round()
        .await
        .map_err(|err| internal_err(format!("Could not load the current round: {err}")))?;

    let current = match &current_round {
        Some(round) => {
            let questions = data
                .round_repository
                .questions_for(round.id)
                .await
                .map_err(|err| internal_err(format!("Could not load questions: {err}")))?;
            Some((round, visible_questions(round, &questions, team.is_admin, now)))
        }
        None => None,
    };

    let view = StatusView {
        team: &team,
        rounds: &rounds,
        standings: &standings,
        history: &history,
        current,
        now,
    };

    let mut reply = CreateReply::default()
        .ephemeral(true)
        .content(fit_message(&render_status(&view)));

    for reference in view.picture_references() {
        match data.media.attachment(reference).await {
            Ok(attachment) => reply = reply.attachment(attachment),
            Err(err) => warn!("Could not attach a picture: {err}"),
        }
    }

    ctx.send(reply).await?;

    Ok(())
}

fn visible_questions(round: &Round, questions: &[Question], for_host: bool, now: UtcDateTime) -> Vec<Question> {
    match Disclosure::for_round(round, now) {
        Some(disclosure) => questions
            .iter()
            .map(|question| disclosure.filter(question, for_host))
            .collect(),
        None => Vec::new(),
    }
}

impl StatusView<'_> {
    /// Image references in display order, the same order as the `picture n`
    /// markers in the rendered text.
    fn picture_references(&self) -> Vec<&str> {
        let Some((_, questions)) = &self.current else {
            return Vec::new();
        };

        questions
            .iter()
            .flat_map(|question| {
                [Some(&question.prompt), question.hint1.as_ref(), question.hint2.as_ref()]
            })
            .flatten()
            .filter_map(|content| match content {
                Content::Image(reference) => Some(reference.as_str()),
                Content::Text(_) => None,
            })
            .collect()
    }
}

fn render_status(view: &StatusView) -> String {
    let mut content = String::new();

    match view.rounds.iter().find(|round| round.is_active()) {
        Some(round) => {
            content += &format!("# {} is running\n", round.name);
            if let Some(schedule) = HintSchedule::for_round(round) {
                if let Some(reveal) = schedule.next_reveal(view.now) {
                    content += &format!(
                        "Next hint {}.\n",
                        timestamp(reveal, TimestampStyle::Relative)
                    );
                }
                if schedule.remaining(view.now).is_zero() {
                    content += "Time is up, the hosts will close the round shortly.\n";
                } else {
                    content += &format!(
                        "Time runs out {} ({} UTC).\n",
                        timestamp(schedule.exhausted_at(), TimestampStyle::Relative),
                        format_utc_time(schedule.exhausted_at()),
                    );
                }
            }
        }
        None => content += "# No round is running\n",
    }

    if let Some((round, questions)) = &view.current {
        content += &format!("\n## Questions of {}\n", round.name);
        let mut picture = 0;
        let mut describe = |field: &Content| match field {
            Content::Text(text) => text.clone(),
            Content::Image(_) => {
                picture += 1;
                format!("(picture {picture})")
            }
        };

        for question in questions {
            content += &format!("**{}.** {}\n", question.letter, describe(&question.prompt));
            for hint in [&question.hint1, &question.hint2].into_iter().flatten() {
                content += &format!(" - Hint: {}\n", describe(hint));
            }
        }
    }

    if !view.standings.is_empty() {
        content += "\n## Leaderboard\n";
        for (position, standing) in view.standings.iter().enumerate() {
            let marker = if standing.team_id == view.team.id { " ⬅" } else { "" };
            content += &format!(
                "{}. {} ({}){marker}\n",
                position + 1,
                standing.team_name,
                standing.total
            );
        }
    }

    if !view.rounds.is_empty() {
        content += "\n## Rounds\n";
        for round in view.rounds {
            content += &format!(" - {}: {}\n", round.name, round.state);
        }
    }

    if !view.history.is_empty() {
        let round_states: HashMap<RoundId, RoundState> = view
            .rounds
            .iter()
            .map(|round| (round.id, round.state))
            .collect();

        content += &format!("\n## Answers of {}\n", view.team.name);
        for action in view.history.iter().rev() {
            // Points of a running round would give the answers away.
            let points = match round_states.get(&action.round_id) {
                Some(RoundState::Finished) => format!(" ({})", format_points(action.points)),
                _ => String::new(),
            };
            content += &format!(
                " - {} `{}` {}{points}\n",
                format_utc_time(action.submitted_at),
                action.letter,
                action.answered,
            );
        }
    }

    content
}
