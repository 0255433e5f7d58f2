use crate::{
    commands::{
        flag::started_text,
        leaderboard::{period_title, points_lines, streak_lines, NO_SCORES},
        CommandError, Data,
    },
    constants::LEADERBOARD_LIMIT,
    message_utils::{failure_embed, info_embed, lines_description, success_embed},
    quiz::{
        gateway::{DashboardAction, QuizComponent},
        registry::RoundKey,
        ButtonOutcome, Period,
    },
};
use poise::{
    serenity_prelude::{
        self as serenity, ComponentInteraction, CreateInteractionResponseFollowup,
        EditInteractionResponse, FullEvent, Message,
    },
    FrameworkContext,
};
use tracing::{debug, warn};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: FrameworkContext<'_, Data, CommandError>,
    data: &Data,
) -> Result<(), CommandError> {
    match event {
        FullEvent::Message { new_message } => on_message(ctx, new_message, data).await,
        FullEvent::InteractionCreate { interaction } => {
            let Some(component) = interaction.as_message_component() else {
                return Ok(());
            };
            let Some(parsed) = QuizComponent::parse(&component.data.custom_id) else {
                return Ok(());
            };
            on_component(ctx, component, parsed, data).await
        }
        _ => Ok(()),
    }
}

async fn on_message(
    ctx: &serenity::Context,
    message: &Message,
    data: &Data,
) -> Result<(), CommandError> {
    if message.author.bot {
        return Ok(());
    }
    let Some(guild) = message.guild_id else {
        return Ok(());
    };
    let key = RoundKey {
        guild,
        channel: message.channel_id,
        user: message.author.id,
    };
    if data
        .quiz
        .handle_text_answer(key, &message.content)
        .await?
        .is_some()
    {
        if let Err(err) = message.delete(ctx).await {
            warn!("Failed to delete answer message {}: {err}", message.id);
        }
    }
    Ok(())
}

async fn on_component(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    parsed: QuizComponent,
    data: &Data,
) -> Result<(), CommandError> {
    let Some(guild) = component.guild_id else {
        return Ok(());
    };
    let presser = component.user.id;
    match parsed {
        QuizComponent::Easy {
            owner,
            round_id,
            code,
        } => {
            component.defer(ctx).await?;
            let key = RoundKey {
                guild,
                channel: component.channel_id,
                user: owner,
            };
            let notice = match data
                .quiz
                .handle_easy_button(key, presser, round_id, &code)
                .await?
            {
                ButtonOutcome::Resolved(resolution) => {
                    debug!("Round {} resolved by button", resolution.round_id);
                    return Ok(());
                }
                ButtonOutcome::NotYourRound => "This is not your round.",
                ButtonOutcome::Expired => "This round is already over.",
                ButtonOutcome::Disabled => "The flag quiz is disabled on this server.",
            };
            component
                .create_followup(
                    ctx,
                    CreateInteractionResponseFollowup::new()
                        .embed(failure_embed(notice))
                        .ephemeral(true),
                )
                .await?;
        }
        QuizComponent::Dashboard(action) => {
            component.defer_ephemeral(ctx).await?;
            let embed = match action {
                DashboardAction::Play(mode) => {
                    let key = RoundKey {
                        guild,
                        channel: component.channel_id,
                        user: presser,
                    };
                    match data.quiz.start_round(key, mode, None).await {
                        Ok(round) => success_embed(started_text(&round)),
                        Err(err) => match CommandError::from(err) {
                            CommandError::Expected(reason) => failure_embed(reason),
                            err @ CommandError::Unexpected(_) => return Err(err),
                        },
                    }
                }
                DashboardAction::Leaderboard => {
                    let rows = data
                        .quiz
                        .leaderboard(guild, Period::AllTime, LEADERBOARD_LIMIT)
                        .await?;
                    info_embed(lines_description(points_lines(&rows), NO_SCORES))
                        .title(period_title(Period::AllTime))
                }
                DashboardAction::Streaks => {
                    let rows = data
                        .quiz
                        .streak_leaderboard(guild, LEADERBOARD_LIMIT)
                        .await?;
                    info_embed(lines_description(streak_lines(&rows), NO_SCORES))
                        .title("Flag quiz streaks")
                }
            };
            component
                .edit_response(ctx, EditInteractionResponse::new().embed(embed))
                .await?;
        }
    }
    Ok(())
}
