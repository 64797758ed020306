use poise::{serenity_prelude::User, CreateReply};

use crate::{
    commands::{caller_person, internal_err, user_err, CommandResult, Context},
    repository::JoinOutcome,
};

/// Join the team of someone on the roster.
#[poise::command(slash_command, rename = "join")]
pub async fn join(
    ctx: Context<'_>,
    #[description = "A member of the team to join."] teammate: User,
) -> CommandResult {
    let person = caller_person(ctx).await?;

    let outcome = ctx
        .data()
        .person_repository
        .join_team_of(person.id, &teammate.id.to_string())
        .await
        .map_err(|err| internal_err(format!("Could not join the team: {err}")))?;

    match outcome {
        JoinOutcome::Joined(team_id) => {
            let team_name = ctx
                .data()
                .team_repository
                .get_team(team_id)
                .await
                .ok()
                .flatten()
                .map(|team| team.name)
                .unwrap_or_else(|| format!("team {}", team_id.0));

            ctx.send(
                CreateReply::default()
                    .ephemeral(true)
                    .content(format!("**You joined {team_name}.**")),
            )
            .await?;
            Ok(())
        }
        JoinOutcome::NoSuchPerson => Err(user_err(format!(
            "**{} is not on the roster.**",
            teammate.name
        ))),
        JoinOutcome::TargetHasNoTeam => Err(user_err(format!(
            "**{} has no team yet.**\n\nOne of you can start one with `/team create`.",
            teammate.name
        ))),
        JoinOutcome::TeamFull => Err(user_err(format!(
            "**The team of {} is full.**",
            teammate.name
        ))),
    }
}
