use poise::{Context, CreateReply, FrameworkError};
use tracing::{error, warn};

use crate::{commands::CommandError, BotState};

pub async fn handle_error(error: poise::FrameworkError<'_, BotState, CommandError>) {
    use FrameworkError::*;

    match error {
        Setup { error, .. } => {
            error!("Error in bot setup: {}", error);
        }

        EventHandler { error, event, .. } => {
            error!(
                "Error in event {} handler: {}",
                event.snake_case_name(),
                error
            );
        }

        Command { error, ctx, .. } => match error {
            CommandError::User { message } => {
                reply_with_error(ctx, &message).await;
            }

            // The details go to the log only; a reply could leak answers or scores.
            CommandError::Internal { message } => {
                error!(
                    "Internal error in /{}: {}",
                    ctx.command().qualified_name,
                    message
                );
                reply_with_internal_error(ctx).await;
            }

            CommandError::Serenity(error) => {
                error!(
                    "Discord error in /{}: {}",
                    ctx.command().qualified_name,
                    error
                );
                reply_with_internal_error(ctx).await;
            }
        },

        ArgumentParse {
            error, input, ctx, ..
        } => {
            let response = match input {
                Some(input) => format!(
                    "**Sorry, `{}` doesn't work here: {}**",
                    input.escape_default(),
                    error
                ),
                None => format!("**{}**", error),
            };

            reply_with_error(ctx, &response).await;
        }

        CommandStructureMismatch {
            description, ctx, ..
        } => {
            error!(
                "Failed to deserialize interaction arguments for `{}`: {}",
                ctx.command.qualified_name, description
            );
        }

        CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                error!(
                    "Check of /{} failed: {}",
                    ctx.command().qualified_name,
                    error
                );
            }

            reply_with_error(ctx, "Sorry, only the quiz hosts can use this command.").await;
        }

        GuildOnly { ctx, .. } => {
            reply_with_error(ctx, "Sorry, this command only works in the quiz server.").await;
        }

        UnknownInteraction { interaction, .. } => {
            warn!("Received an unknown interaction: {:?}", interaction.data.name);
        }

        error => {
            warn!("Unhandled framework error: {}", error);
        }
    }
}

async fn reply_with_error(ctx: Context<'_, BotState, CommandError>, error_message: &str) {
    if let Err(send_error) = poise::send_reply(
        ctx,
        CreateReply::default()
            .content(error_message)
            .ephemeral(true),
    )
    .await
    {
        error!(
            "Failed to send an error message to the user: {}\nThe message was: {}",
            send_error, error_message
        );
    }
}

async fn reply_with_internal_error(ctx: Context<'_, BotState, CommandError>) {
    reply_with_error(
        ctx,
        "Sorry, something went wrong on our side. Please try again or ask the hosts.",
    )
    .await;
}
