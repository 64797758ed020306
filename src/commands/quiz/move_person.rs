use poise::CreateReply;

use crate::{
    commands::{internal_err, user_err, CommandResult, Context},
    models::{PersonId, TeamId},
};

/// Put a person into a team, or take them out of any team.
#[poise::command(slash_command, rename = "move")]
pub async fn move_person(
    ctx: Context<'_>,
    #[description = "Roster id of the person."] person: i64,
    #[description = "Team id. Leave empty to remove the person from their team."] team: Option<i64>,
) -> CommandResult {
    let data = ctx.data();

    let moved = data
        .person_repository
        .move_person(PersonId(person), team.map(TeamId))
        .await
        .map_err(|err| internal_err(format!("Could not move person {person}: {err}")))?;

    if !moved {
        return Err(user_err(format!(
            "**Person {person} or the team does not exist.**"
        )));
    }

    let name = data
        .person_repository
        .get_person(PersonId(person))
        .await
        .ok()
        .flatten()
        .map(|person| person.name)
        .unwrap_or_else(|| format!("Person {person}"));

    let message = match team {
        Some(team) => format!("**{name} is now on team {team}.**"),
        None => format!("**{name} is not on any team now.**"),
    };
    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
