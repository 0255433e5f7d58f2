use crate::{
    commands::{CommandError, Data},
    message_utils::failure_embed,
};
use anyhow::Result;
use poise::{CreateReply, FrameworkError};
use tracing::{error, warn};

/// Text shown to the user for `error`, logging whatever should not be shown.
/// `None` means the error is only logged.
fn user_facing(error: &FrameworkError<'_, Data, CommandError>) -> Option<String> {
    match error {
        FrameworkError::Setup { error, .. } => {
            error!("Failed to set up the quiz: {error:?}");
            None
        }
        FrameworkError::EventHandler { error, event, .. } => {
            error!("Handling the {} event failed: {error}", event.snake_case_name());
            None
        }
        FrameworkError::Command {
            error: CommandError::Expected(reason),
            ..
        } => Some(reason.clone()),
        FrameworkError::Command {
            ctx,
            error: CommandError::Unexpected(err),
            ..
        } => {
            error!("Command /{} failed: {err:?}", ctx.command().qualified_name);
            Some("Something went wrong while running this command, please try again later.".into())
        }
        FrameworkError::SubcommandRequired { ctx } => {
            let names = ctx
                .command()
                .subcommands
                .iter()
                .map(|subcommand| format!("`{}`", subcommand.name))
                .collect::<Vec<_>>();
            Some(format!("Pick one of: {}", names.join(", ")))
        }
        FrameworkError::CommandPanic { ctx, payload, .. } => {
            error!("Command /{} panicked: {payload:?}", ctx.command().qualified_name);
            Some("An unexpected internal error has occurred.".into())
        }
        FrameworkError::ArgumentParse {
            ctx, input, error, ..
        } => {
            let usage = ctx
                .command()
                .help_text
                .as_deref()
                .unwrap_or("See /help for how to use this command.");
            Some(input.as_ref().map_or_else(
                || format!("**{error}**\n{usage}"),
                |input| format!("**`{input}` is not a valid argument: {error}**\n{usage}"),
            ))
        }
        FrameworkError::CommandStructureMismatch {
            ctx, description, ..
        } => {
            error!(
                "Interaction arguments of /{} did not match: {description}",
                ctx.command.qualified_name
            );
            None
        }
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ..
        } => Some(format!(
            "I'm missing permissions for this command: {missing_permissions}"
        )),
        FrameworkError::MissingUserPermissions {
            missing_permissions: Some(missing),
            ..
        } => Some(format!("You're missing permissions for this command: {missing}")),
        FrameworkError::MissingUserPermissions { .. } => {
            Some("Your permissions could not be checked, so this command was not run.".into())
        }
        FrameworkError::NotAnOwner { .. } => Some("Only bot owners can use this command.".into()),
        FrameworkError::GuildOnly { .. } => {
            Some("The flag quiz is only played in servers.".into())
        }
        FrameworkError::UnknownInteraction { interaction, .. } => {
            warn!("Received unknown interaction \"{}\"", interaction.data.name);
            None
        }
        _ => None,
    }
}

pub async fn handle(error: FrameworkError<'_, Data, CommandError>) -> Result<()> {
    let Some(content) = user_facing(&error) else {
        return Ok(());
    };
    if let Some(ctx) = error.ctx() {
        ctx.send(
            CreateReply::default()
                .embed(failure_embed(content))
                .ephemeral(true),
        )
        .await?;
    }
    Ok(())
}
