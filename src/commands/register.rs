use super::{CommandResult, Context};
use poise::{builtins, command};

/// Register or remove the slash commands
#[command(prefix_command, owners_only, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> CommandResult {
    builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}
