use poise::CreateReply;

use crate::commands::{caller_person, internal_err, user_err, CommandResult, Context};

/// Show your team and teammates.
#[poise::command(slash_command, rename = "show")]
pub async fn show(ctx: Context<'_>) -> CommandResult {
    let person = caller_person(ctx).await?;
    let data = ctx.data();

    let published = data
        .person_repository
        .teams_published()
        .await
        .map_err(|err| internal_err(format!("Could not check the teams: {err}")))?;
    if !published {
        return Err(user_err("**Teams have not been announced yet.**"));
    }

    let Some(team_id) = person.team_id else {
        if person.awaits_random_team() {
            return Err(user_err(
                "**You are still waiting for a team.**\n\nThe hosts will place you before the quiz starts.",
            ));
        }
        return Err(user_err("**You are not on a team.**"));
    };

    let team = data
        .team_repository
        .get_team(team_id)
        .await
        .map_err(|err| internal_err(format!("Could not load the team: {err}")))?
        .ok_or_else(|| internal_err(format!("Team {} vanished", team_id.0)))?;

    let members = data
        .person_repository
        .team_members(team_id)
        .await
        .map_err(|err| internal_err(format!("Could not load the teammates: {err}")))?;

    let list = members.iter().fold(String::new(), |acc, member| {
        acc + &format!(" - {}\n", member.name)
    });

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content(format!("# {}\n{list}", team.name)),
    )
    .await?;

    Ok(())
}
