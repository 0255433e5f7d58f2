use super::{guild_id, CommandResult, Context};
use crate::{constants::LEADERBOARD_LIMIT, message_utils::render_lines_reply, quiz::Period};
use poise::{
    command,
    serenity_prelude::{Mentionable, UserId},
};

pub const NO_SCORES: &str = "Nobody has scored yet.";

pub fn points_lines(rows: &[(UserId, i64)]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(rank, (user, points))| {
            format!("{}. {} with **{points}** points", rank + 1, user.mention())
        })
        .collect()
}

pub fn streak_lines(rows: &[(UserId, i64, i64)]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(rank, (user, current, best))| {
            format!(
                "{}. {} best **{best}**, current {current}",
                rank + 1,
                user.mention()
            )
        })
        .collect()
}

pub const fn period_title(period: Period) -> &'static str {
    match period {
        Period::Weekly => "Weekly flag quiz leaderboard",
        Period::Monthly => "Monthly flag quiz leaderboard",
        Period::AllTime => "All-time flag quiz leaderboard",
    }
}

async fn points_leaderboard(ctx: Context<'_>, period: Period) -> CommandResult {
    let rows = ctx
        .data()
        .quiz
        .leaderboard(guild_id(ctx)?, period, LEADERBOARD_LIMIT)
        .await?;
    ctx.send(render_lines_reply(
        points_lines(&rows),
        period_title(period),
        NO_SCORES,
    ))
    .await?;
    Ok(())
}

#[allow(clippy::unused_async)]
#[command(
    slash_command,
    subcommands("weekly", "monthly", "alltime", "streaks"),
    guild_only
)]
/// Flag quiz leaderboards
pub async fn leaderboard(_: Context<'_>) -> CommandResult {
    Ok(())
}

#[command(slash_command, guild_only)]
/// Points collected this week
pub async fn weekly(ctx: Context<'_>) -> CommandResult {
    points_leaderboard(ctx, Period::Weekly).await
}

#[command(slash_command, guild_only)]
/// Points collected this month
pub async fn monthly(ctx: Context<'_>) -> CommandResult {
    points_leaderboard(ctx, Period::Monthly).await
}

#[command(slash_command, guild_only)]
/// Points collected overall
pub async fn alltime(ctx: Context<'_>) -> CommandResult {
    points_leaderboard(ctx, Period::AllTime).await
}

#[command(slash_command, guild_only)]
/// Longest answer streaks
pub async fn streaks(ctx: Context<'_>) -> CommandResult {
    let rows = ctx
        .data()
        .quiz
        .streak_leaderboard(guild_id(ctx)?, LEADERBOARD_LIMIT)
        .await?;
    ctx.send(render_lines_reply(
        streak_lines(&rows),
        "Flag quiz streaks",
        NO_SCORES,
    ))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_ranked() {
        let lines = points_lines(&[(UserId::new(3), 40), (UserId::new(4), 20)]);
        assert_eq!(lines[0], "1. <@3> with **40** points");
        assert_eq!(lines[1], "2. <@4> with **20** points");
        assert_eq!(
            streak_lines(&[(UserId::new(3), 2, 7)]),
            ["1. <@3> best **7**, current 2"]
        );
    }
}
