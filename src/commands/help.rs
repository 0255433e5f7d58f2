use super::{CommandResult, Context};
use poise::{builtins, command, samples::HelpConfiguration};

/// An overview of the flag quiz commands
#[command(slash_command, ephemeral)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Show help for one command"] command: Option<String>,
) -> CommandResult {
    builtins::help(
        ctx,
        command.as_deref(),
        HelpConfiguration {
            show_subcommands: true,
            extra_text_at_bottom: "Start a round with /flag start and type the country in chat. \
                                   Messages starting with ! are never taken as answers.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}
