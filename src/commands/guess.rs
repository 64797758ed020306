use indoc::formatdoc;
use poise::CreateReply;

use crate::{
    commands::{
        arguments::FreeText, caller_team, internal_err, user_err, ApplicationContext,
        CommandResult,
    },
    models::{types::UtcDateTime, GuessOutcome},
};

/// Answer one question of the running round.
#[poise::command(slash_command, rename = "guess")]
pub async fn guess(
    ctx: ApplicationContext<'_>,
    #[description = "The question letter, e.g. `B`."] letter: String,
    #[description = "Your answer."] answer: FreeText,
) -> CommandResult {
    let team = caller_team(ctx.into()).await?;
    let now = UtcDateTime::now();

    let outcome = ctx
        .data
        .guess_repository
        .submit_guess(team.id, &letter, answer.as_ref(), now)
        .await
        .map_err(|err| internal_err(format!("Could not record the answer: {err}")))?;

    let message = match outcome {
        GuessOutcome::Submitted => formatdoc! {
            r#"
                **Answer for `{letter}` recorded** (`{outcome}`).

                You can send another answer for the same letter while the round runs. The latest distinct answer counts.
            "#,
            letter = letter.trim().to_uppercase(),
        },

        GuessOutcome::NoLetter => {
            return Err(user_err(formatdoc! {
                r#"
                    **`{letter}` is not a question letter** (`{outcome}`).

                    Use the single letter shown next to the question, e.g. `/guess B Paris`.
                "#,
                letter = letter.escape_default(),
            }));
        }

        GuessOutcome::NoActiveRound => {
            return Err(user_err(formatdoc! {
                r#"
                    **No running round has a question `{letter}`** (`{outcome}`).

                    Check `/status` for the current round and its questions.
                "#,
                letter = letter.trim().to_uppercase(),
            }));
        }
    };

    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}
