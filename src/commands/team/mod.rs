mod create;
mod join;
mod leave;
mod show;

use super::{user_err, CommandResult, Context};

#[poise::command(
    slash_command,
    subcommands("create::create", "join::join", "leave::leave", "show::show")
)]
pub async fn team(_ctx: Context<'_>) -> CommandResult {
    Err(user_err("Use one of the `/team` subcommands"))
}
