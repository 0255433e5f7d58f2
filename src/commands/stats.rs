use super::{guild_id, CommandResult, Context};
use crate::{message_utils::info_embed, quiz::stats::PlayerStats};
use poise::{command, serenity_prelude::User, CreateReply};

fn achievement_label(code: &str) -> String {
    code.strip_prefix("flag_streak_").map_or_else(
        || code.to_owned(),
        |milestone| format!("Streak of {milestone}"),
    )
}

fn stats_description(stats: &PlayerStats, achievements: &[String]) -> String {
    let accuracy = if stats.rounds() == 0 {
        0
    } else {
        stats.correct * 100 / stats.rounds()
    };
    let achievements = if achievements.is_empty() {
        "none yet".to_owned()
    } else {
        achievements
            .iter()
            .map(|code| achievement_label(code))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Points: **{}** (this week {}, this month {})\nCorrect: {} / Wrong: {} ({accuracy}%)\nStreak: {} (best {})\nAchievements: {achievements}",
        stats.total_points,
        stats.weekly_points,
        stats.monthly_points,
        stats.correct,
        stats.wrong,
        stats.current_streak,
        stats.best_streak,
    )
}

/// Flag quiz stats of you or another member
#[command(slash_command, guild_only, ephemeral)]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "Defaults to you"] user: Option<User>,
) -> CommandResult {
    let guild = guild_id(ctx)?;
    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let quiz = &ctx.data().quiz;
    let stats = quiz.stats_for(guild, user.id).await?;
    let achievements = quiz.achievements_for(guild, user.id).await?;
    ctx.send(
        CreateReply::default().embed(
            info_embed(stats_description(&stats, &achievements))
                .title(format!("Flag quiz stats of {}", user.name)),
        ),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_lists_accuracy_and_achievements() {
        let stats = PlayerStats {
            total_points: 30,
            correct: 3,
            wrong: 1,
            current_streak: 2,
            best_streak: 5,
            ..PlayerStats::default()
        };
        let text = stats_description(&stats, &["flag_streak_5".to_owned()]);
        assert!(text.contains("Points: **30**"));
        assert!(text.contains("(75%)"));
        assert!(text.ends_with("Achievements: Streak of 5"));
        assert!(stats_description(&PlayerStats::default(), &[]).contains("(0%)"));
    }
}
