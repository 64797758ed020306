mod define;
mod form_teams;
mod move_person;
mod progress;
mod publish;
mod reset;
mod round;
mod roster;

use super::{user_err, CommandResult, Context};

/// Host tools. Only members of an administrator team pass the check.
#[poise::command(
    slash_command,
    check = "super::is_host",
    subcommands(
        "round::round",
        "progress::progress",
        "define::define",
        "roster::roster",
        "form_teams::form_teams",
        "move_person::move_person",
        "publish::publish",
        "reset::reset"
    )
)]
pub async fn quiz(_ctx: Context<'_>) -> CommandResult {
    Err(user_err("Use one of the `/quiz` subcommands"))
}
