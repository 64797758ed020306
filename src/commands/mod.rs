mod answers;
mod arguments;
mod guess;
mod quiz;
mod register;
mod rename;
mod status;
mod team;

use crate::{
    models::{Person, Team},
    BotState,
};

pub use answers::answers;
pub use guess::guess;
pub use quiz::quiz;
pub use register::register;
pub use rename::rename;
pub use status::status;
pub use team::team;

type CommandResult = Result<(), CommandError>;
type Context<'a> = poise::Context<'a, BotState, CommandError>;
type ApplicationContext<'a> = poise::ApplicationContext<'a, BotState, CommandError>;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

/// The Discord user id is the credential: it is stored as a person's login,
/// and the person's team is the team acting.
async fn caller_team(ctx: Context<'_>) -> Result<Team, CommandError> {
    let login = ctx.author().id.to_string();

    match ctx.data().team_repository.find_for_login(&login).await {
        Ok(Some(team)) => Ok(team),
        Ok(None) => Err(user_err(
            "**You are not on a team.**\n\nRegister with `/register` or ask the hosts to place you.",
        )),
        Err(err) => Err(internal_err(format!("Could not resolve your team: {err}"))),
    }
}

async fn caller_person(ctx: Context<'_>) -> Result<Person, CommandError> {
    let login = ctx.author().id.to_string();

    match ctx.data().person_repository.find_by_login(&login).await {
        Ok(Some(person)) => Ok(person),
        Ok(None) => Err(user_err(
            "**You are not on the roster.**\n\nAsk the hosts to add your Discord account.",
        )),
        Err(err) => Err(internal_err(format!("Could not look you up: {err}"))),
    }
}

/// Command check for the `/quiz` group: the caller's team must carry the
/// administrator flag.
async fn is_host(ctx: Context<'_>) -> Result<bool, CommandError> {
    let login = ctx.author().id.to_string();

    match ctx.data().team_repository.find_for_login(&login).await {
        Ok(team) => Ok(team.is_some_and(|team| team.is_admin)),
        Err(err) => Err(internal_err(format!("Could not check permissions: {err}"))),
    }
}
