use super::{guild_id, round_key, CommandError, CommandResult, Context};
use crate::{
    message_utils::{info_embed, render_lines_reply, success_message},
    quiz::{catalog::parse_blacklist, stats::Mode, RoundStarted},
};
use poise::{
    command,
    serenity_prelude::{GuildChannel, Mentionable, Role},
    ChoiceParameter, CreateReply,
};

#[derive(Debug, Clone, Copy, ChoiceParameter)]
pub enum PlayMode {
    #[name = "Normal: type the country"]
    Normal,
    #[name = "Easy: pick from four countries"]
    Easy,
}

impl From<PlayMode> for Mode {
    fn from(value: PlayMode) -> Self {
        match value {
            PlayMode::Normal => Self::Normal,
            PlayMode::Easy => Self::Easy,
        }
    }
}

pub fn started_text(round: &RoundStarted) -> String {
    let deadline = format!("<t:{}:R>", round.expires_at.timestamp());
    match round.mode {
        Mode::Easy => format!("Your flag is up! Pick the right country {deadline}."),
        Mode::Bet => format!(
            "You wagered **{}** points. Name the country {deadline}.",
            round.wager
        ),
        Mode::Daily => format!("Today's flag is up! Name the country {deadline}."),
        Mode::Normal => format!("Your flag is up! Name the country {deadline}."),
    }
}

async fn play(ctx: Context<'_>, mode: Mode, wager: Option<i64>) -> CommandResult {
    let key = round_key(ctx)?;
    ctx.defer_ephemeral().await?;
    let round = ctx.data().quiz.start_round(key, mode, wager).await?;
    ctx.send(success_message(started_text(&round))).await?;
    Ok(())
}

#[allow(clippy::unused_async)]
#[command(
    slash_command,
    subcommands(
        "setup",
        "panel",
        "start",
        "daily",
        "bet",
        "info",
        "topflags",
        "enable",
        "disable",
        "blacklist",
        "leaderrole"
    ),
    guild_only
)]
/// Guess the country of a flag
pub async fn flag(_: Context<'_>) -> CommandResult {
    Ok(())
}

#[command(
    slash_command,
    required_bot_permissions = "VIEW_CHANNEL | SEND_MESSAGES | EMBED_LINKS",
    default_member_permissions = "MANAGE_CHANNELS",
    guild_only,
    ephemeral
)]
/// Set the flag quiz channel and post the dashboard there
pub async fn setup(
    ctx: Context<'_>,
    #[description = "Quiz channel, defaults to this one"]
    #[channel_types("Text")]
    channel: Option<GuildChannel>,
) -> CommandResult {
    let channel = channel.map_or_else(|| ctx.channel_id(), |channel| channel.id);
    ctx.data()
        .quiz
        .setup_channel(guild_id(ctx)?, channel)
        .await?;
    ctx.send(success_message(format!(
        "The flag quiz now lives in {}.",
        channel.mention()
    )))
    .await?;
    Ok(())
}

#[command(
    slash_command,
    required_bot_permissions = "VIEW_CHANNEL | SEND_MESSAGES | EMBED_LINKS",
    default_member_permissions = "MANAGE_CHANNELS",
    guild_only,
    ephemeral
)]
/// Post a fresh dashboard in the quiz channel
pub async fn panel(ctx: Context<'_>) -> CommandResult {
    if ctx
        .data()
        .quiz
        .post_dashboard(guild_id(ctx)?)
        .await?
        .is_none()
    {
        return Err(CommandError::Expected(
            "There is no quiz channel yet, run `/flag setup` first.".into(),
        ));
    }
    ctx.send(success_message("Posted a new dashboard.")).await?;
    Ok(())
}

#[command(slash_command, guild_only, ephemeral)]
/// Start a flag round
pub async fn start(
    ctx: Context<'_>,
    #[description = "Defaults to normal"] mode: Option<PlayMode>,
) -> CommandResult {
    play(ctx, mode.map_or(Mode::Normal, Mode::from), None).await
}

#[command(slash_command, guild_only, ephemeral)]
/// Play today's flag, once per day
pub async fn daily(ctx: Context<'_>) -> CommandResult {
    play(ctx, Mode::Daily, None).await
}

#[command(slash_command, guild_only, ephemeral)]
/// Wager points on a faster round
pub async fn bet(
    ctx: Context<'_>,
    #[description = "Points to wager"]
    #[min = 1]
    wager: i64,
) -> CommandResult {
    play(ctx, Mode::Bet, Some(wager)).await
}

#[command(slash_command, guild_only, ephemeral)]
/// Look up a flag and how often it was guessed here
pub async fn info(
    ctx: Context<'_>,
    #[description = "Country name, code or flag emoji"] query: String,
) -> CommandResult {
    let Some(info) = ctx.data().quiz.flag_info(guild_id(ctx)?, &query).await? else {
        return Err(CommandError::Expected(format!(
            "I don't know a country called `{query}`."
        )));
    };
    let stats = info.stats;
    ctx.send(
        CreateReply::default().embed(
            info_embed(format!(
                "Asked **{}** times, guessed **{}** times, missed **{}** times.\nSuccess rate: **{}%**",
                stats.asked,
                stats.correct,
                stats.wrong,
                stats.success_rate()
            ))
            .title(format!("{} ({})", info.name, info.code))
            .thumbnail(info.flag_url),
        ),
    )
    .await?;
    Ok(())
}

#[command(slash_command, guild_only, ephemeral)]
/// The most asked flags in this server
pub async fn topflags(
    ctx: Context<'_>,
    #[description = "How many flags to show"]
    #[min = 1]
    #[max = 20]
    limit: Option<u64>,
) -> CommandResult {
    let flags = ctx
        .data()
        .quiz
        .top_flags(guild_id(ctx)?, limit.unwrap_or(10))
        .await?;
    ctx.send(render_lines_reply(
        flags.iter().enumerate().map(|(rank, flag)| {
            format!(
                "{}. {} ({}) asked {}, {}% correct",
                rank + 1,
                flag.name,
                flag.code,
                flag.stats.asked,
                flag.stats.success_rate()
            )
        }),
        "Most asked flags",
        "No flags were asked yet.",
    ))
    .await?;
    Ok(())
}

#[command(
    slash_command,
    default_member_permissions = "MANAGE_GUILD",
    guild_only,
    ephemeral
)]
/// Allow new flag rounds
pub async fn enable(ctx: Context<'_>) -> CommandResult {
    ctx.data().quiz.set_enabled(guild_id(ctx)?, true).await?;
    ctx.send(success_message("The flag quiz is enabled.")).await?;
    Ok(())
}

#[command(
    slash_command,
    default_member_permissions = "MANAGE_GUILD",
    guild_only,
    ephemeral
)]
/// Stop the flag quiz, running rounds can only time out
pub async fn disable(ctx: Context<'_>) -> CommandResult {
    ctx.data().quiz.set_enabled(guild_id(ctx)?, false).await?;
    ctx.send(success_message("The flag quiz is disabled.")).await?;
    Ok(())
}

#[command(
    slash_command,
    default_member_permissions = "MANAGE_GUILD",
    guild_only,
    ephemeral
)]
/// Set the flags that are never asked
pub async fn blacklist(
    ctx: Context<'_>,
    #[description = "Comma separated country codes, leave empty for the default list"]
    codes: Option<String>,
) -> CommandResult {
    let guild = guild_id(ctx)?;
    let Some(codes) = codes else {
        ctx.data().quiz.set_blacklist(guild, None).await?;
        ctx.send(success_message("Restored the default blacklist."))
            .await?;
        return Ok(());
    };
    let parsed = parse_blacklist(&codes);
    if parsed.is_empty() {
        return Err(CommandError::Expected(
            "No valid two-letter country codes found.".into(),
        ));
    }
    ctx.data().quiz.set_blacklist(guild, Some(&parsed)).await?;
    let mut listed = parsed.into_iter().collect::<Vec<_>>();
    listed.sort_unstable();
    ctx.send(success_message(format!(
        "Blacklisted: {}",
        listed.join(", ")
    )))
    .await?;
    Ok(())
}

#[command(
    slash_command,
    required_bot_permissions = "MANAGE_ROLES",
    default_member_permissions = "MANAGE_ROLES",
    guild_only,
    ephemeral
)]
/// Give a role to the weekly points leader
pub async fn leaderrole(
    ctx: Context<'_>,
    #[description = "Leave empty to stop handing out a role"] role: Option<Role>,
) -> CommandResult {
    let role_id = role.as_ref().map(|role| role.id);
    ctx.data()
        .quiz
        .set_leader_role(guild_id(ctx)?, role_id)
        .await?;
    let content = role_id.map_or_else(
        || "The weekly leader no longer gets a role.".to_owned(),
        |role| format!("The weekly leader now gets {}.", role.mention()),
    );
    ctx.send(success_message(content)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use poise::serenity_prelude::MessageId;

    fn round(mode: Mode, wager: i64) -> RoundStarted {
        RoundStarted {
            round_id: 1,
            code: "DE".into(),
            mode,
            wager,
            options: Vec::new(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            prompt: MessageId::new(1),
        }
    }

    #[test]
    fn started_text_mentions_deadline_and_wager() {
        assert_eq!(
            started_text(&round(Mode::Normal, 0)),
            "Your flag is up! Name the country <t:1700000000:R>."
        );
        assert!(started_text(&round(Mode::Bet, 30)).contains("**30** points"));
        assert_eq!(Mode::from(PlayMode::Easy), Mode::Easy);
    }
}
