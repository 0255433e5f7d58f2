use super::stats::{FlagStats, Mode};
use crate::{
    constants::{CUSTOM_ID_PREFIX, FAILURE_COLOR, INFO_COLOR, SUCCESS_COLOR},
    message_utils::info_embed,
};
use chrono::{DateTime, Utc};
use migration::async_trait::async_trait;
use poise::serenity_prelude::{
    ButtonStyle, Cache, ChannelId, CreateActionRow, CreateButton, CreateEmbed, CreateMessage,
    EditMessage, Error as SerenityError, GuildId, Http, HttpError, Mentionable, MessageId, RoleId,
    UserId,
};
use std::{fmt::Write, sync::Arc};
use tracing::debug;

const BUTTON_LABEL_MAX_LENGTH: usize = 80;

/// Everything a round prompt shows.
#[derive(Debug, Clone)]
pub struct RoundPrompt {
    pub user: UserId,
    pub round_id: u64,
    pub mode: Mode,
    pub flag_url: String,
    pub expires_at: DateTime<Utc>,
    pub wager: i64,
    pub flag: FlagStats,
    /// (code, display name) of the easy-mode buttons, empty otherwise.
    pub options: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct RoundReport {
    pub user: UserId,
    pub mode: Mode,
    pub verdict: Verdict,
    pub code: String,
    pub name: String,
    pub flag_url: String,
    pub points: i64,
    pub wager: i64,
    pub total_points: i64,
    pub streak: i64,
    pub flag: FlagStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub players: u64,
    pub rounds: i64,
    pub best_streak: i64,
    pub leader: Option<(UserId, i64)>,
    pub enabled: bool,
}

/// Outbound side effects of the quiz.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_prompt(
        &self,
        channel: ChannelId,
        prompt: &RoundPrompt,
    ) -> Result<MessageId, SerenityError>;
    async fn send_result(&self, channel: ChannelId, report: &RoundReport)
        -> Result<(), SerenityError>;
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), SerenityError>;
    async fn announce(&self, channel: ChannelId, content: String) -> Result<(), SerenityError>;
    /// Edits `message` if given, otherwise sends a new dashboard.
    async fn upsert_dashboard(
        &self,
        channel: ChannelId,
        message: Option<MessageId>,
        summary: &DashboardSummary,
    ) -> Result<MessageId, SerenityError>;
    async fn grant_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), SerenityError>;
    async fn revoke_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), SerenityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Play(Mode),
    Leaderboard,
    Streaks,
}

impl DashboardAction {
    /// Bets need a wager, so they are only started through the command.
    const ALL: [Self; 5] = [
        Self::Play(Mode::Normal),
        Self::Play(Mode::Easy),
        Self::Play(Mode::Daily),
        Self::Leaderboard,
        Self::Streaks,
    ];
    const fn as_str(self) -> &'static str {
        match self {
            Self::Play(mode) => mode.as_str(),
            Self::Leaderboard => "leaderboard",
            Self::Streaks => "streaks",
        }
    }
    const fn label(self) -> &'static str {
        match self {
            Self::Play(Mode::Normal | Mode::Bet) => "Play",
            Self::Play(Mode::Easy) => "Easy",
            Self::Play(Mode::Daily) => "Daily flag",
            Self::Leaderboard => "Leaderboard",
            Self::Streaks => "Streaks",
        }
    }
}

/// A decoded `flagquiz:` custom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizComponent {
    Easy {
        owner: UserId,
        round_id: u64,
        code: String,
    },
    Dashboard(DashboardAction),
}

impl QuizComponent {
    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.split(':');
        if parts.next()? != CUSTOM_ID_PREFIX {
            return None;
        }
        let component = match parts.next()? {
            "easy" => {
                let owner = parts.next()?.parse::<u64>().ok().filter(|id| *id != 0)?;
                let round_id = parts.next()?.parse().ok()?;
                let code = parts.next()?.to_uppercase();
                Self::Easy {
                    owner: UserId::new(owner),
                    round_id,
                    code,
                }
            }
            "dash" => {
                let action = parts.next()?;
                Self::Dashboard(
                    DashboardAction::ALL
                        .into_iter()
                        .find(|candidate| candidate.as_str() == action)?,
                )
            }
            _ => return None,
        };
        parts.next().is_none().then_some(component)
    }
    pub fn custom_id(&self) -> String {
        match self {
            Self::Easy {
                owner,
                round_id,
                code,
            } => format!("{CUSTOM_ID_PREFIX}:easy:{owner}:{round_id}:{code}"),
            Self::Dashboard(action) => format!("{CUSTOM_ID_PREFIX}:dash:{}", action.as_str()),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

const fn mode_title(mode: Mode) -> &'static str {
    match mode {
        Mode::Normal => "Which country does this flag belong to?",
        Mode::Easy => "Pick the right country!",
        Mode::Daily => "Daily flag",
        Mode::Bet => "Bet round",
    }
}

pub fn prompt_embed(prompt: &RoundPrompt) -> CreateEmbed {
    let mut description = format!(
        "{}, you have until <t:{}:T> (<t:{}:R>).",
        prompt.user.mention(),
        prompt.expires_at.timestamp(),
        prompt.expires_at.timestamp()
    );
    if prompt.mode == Mode::Bet {
        let _ = write!(description, "\nWager: **{}** points", prompt.wager);
    }
    if prompt.options.is_empty() {
        description.push_str("\nType the country name, its code or the flag emoji.");
    }
    if prompt.flag.asked > 1 {
        let _ = write!(
            description,
            "\nThis flag was asked {} times, {}% got it right.",
            prompt.flag.asked,
            prompt.flag.success_rate()
        );
    }
    CreateEmbed::new()
        .title(mode_title(prompt.mode))
        .description(description)
        .image(&prompt.flag_url)
        .color(INFO_COLOR)
}

pub fn result_embed(report: &RoundReport) -> CreateEmbed {
    let answer = format!("**{}** (`{}`)", report.name, report.code);
    let (title, mut description, color) = match report.verdict {
        Verdict::Correct => (
            "Correct!",
            format!(
                "{} recognized {answer} and earned **{}** points.\nStreak: {}",
                report.user.mention(),
                report.points,
                report.streak
            ),
            SUCCESS_COLOR,
        ),
        Verdict::Wrong => (
            "Wrong!",
            format!("{}, the answer was {answer}.", report.user.mention()),
            FAILURE_COLOR,
        ),
        Verdict::TimedOut => (
            "Time is up!",
            format!("{}, the answer was {answer}.", report.user.mention()),
            FAILURE_COLOR,
        ),
    };
    if report.mode == Mode::Bet && report.verdict != Verdict::Correct {
        let _ = write!(description, "\nYour wager of {} points is lost.", report.wager);
    }
    let _ = write!(description, "\nTotal points: {}", report.total_points);
    CreateEmbed::new()
        .title(title)
        .description(description)
        .thumbnail(&report.flag_url)
        .color(color)
}

pub fn dashboard_embed(summary: &DashboardSummary) -> CreateEmbed {
    let mut description = format!(
        "Players: {}\nRounds played: {}\nBest streak: {}",
        summary.players, summary.rounds, summary.best_streak
    );
    if let Some((user, points)) = summary.leader {
        let _ = write!(description, "\nLeader: {} with {points} points", user.mention());
    }
    if !summary.enabled {
        description.push_str("\n\nThe quiz is currently disabled.");
    }
    info_embed(description).title("Flag quiz")
}

fn dashboard_buttons() -> Vec<CreateActionRow> {
    let (play, lists): (Vec<_>, Vec<_>) = DashboardAction::ALL
        .into_iter()
        .partition(|action| matches!(action, DashboardAction::Play(_)));
    [(play, ButtonStyle::Primary), (lists, ButtonStyle::Secondary)]
        .into_iter()
        .map(|(actions, style)| {
            CreateActionRow::Buttons(
                actions
                    .into_iter()
                    .map(|action| {
                        CreateButton::new(QuizComponent::Dashboard(action).custom_id())
                            .label(action.label())
                            .style(style)
                    })
                    .collect(),
            )
        })
        .collect()
}

fn option_buttons(prompt: &RoundPrompt) -> CreateActionRow {
    CreateActionRow::Buttons(
        prompt
            .options
            .iter()
            .map(|(code, name)| {
                CreateButton::new(
                    QuizComponent::Easy {
                        owner: prompt.user,
                        round_id: prompt.round_id,
                        code: code.clone(),
                    }
                    .custom_id(),
                )
                .label(truncate(name, BUTTON_LABEL_MAX_LENGTH))
                .style(ButtonStyle::Primary)
            })
            .collect(),
    )
}

// Unknown Message, or the message was sent by someone else.
const fn is_missing_message(err: &SerenityError) -> bool {
    if let SerenityError::Http(HttpError::UnsuccessfulRequest(err)) = err {
        if let 10008 | 50005 = err.error.code {
            return true;
        }
    }
    false
}

/// [`Gateway`] backed by the Discord HTTP API.
pub struct DiscordGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl DiscordGateway {
    pub const fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
    /// Whether the bot's highest role sits above `role`.
    fn can_manage(&self, guild: GuildId, role: RoleId) -> bool {
        let bot = self.cache.current_user().id;
        let Some(guild) = self.cache.guild(guild) else {
            return false;
        };
        let Some(target) = guild.roles.get(&role) else {
            return false;
        };
        let Some(member) = guild.members.get(&bot) else {
            return false;
        };
        member
            .roles
            .iter()
            .filter_map(|role| guild.roles.get(role))
            .map(|role| role.position)
            .max()
            .is_some_and(|position| position > target.position)
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn send_prompt(
        &self,
        channel: ChannelId,
        prompt: &RoundPrompt,
    ) -> Result<MessageId, SerenityError> {
        let mut message = CreateMessage::new().embed(prompt_embed(prompt));
        if !prompt.options.is_empty() {
            message = message.components(vec![option_buttons(prompt)]);
        }
        Ok(channel
            .send_message((&self.cache, self.http.as_ref()), message)
            .await?
            .id)
    }
    async fn send_result(
        &self,
        channel: ChannelId,
        report: &RoundReport,
    ) -> Result<(), SerenityError> {
        channel
            .send_message(
                (&self.cache, self.http.as_ref()),
                CreateMessage::new().embed(result_embed(report)),
            )
            .await?;
        Ok(())
    }
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), SerenityError> {
        channel
            .delete_message((&self.cache, self.http.as_ref()), message)
            .await
    }
    async fn announce(&self, channel: ChannelId, content: String) -> Result<(), SerenityError> {
        channel.say((&self.cache, self.http.as_ref()), content).await?;
        Ok(())
    }
    async fn upsert_dashboard(
        &self,
        channel: ChannelId,
        message: Option<MessageId>,
        summary: &DashboardSummary,
    ) -> Result<MessageId, SerenityError> {
        if let Some(message) = message {
            let edit = EditMessage::new()
                .embed(dashboard_embed(summary))
                .components(dashboard_buttons());
            match self
                .http
                .edit_message(channel, message, &edit, Vec::new())
                .await
            {
                Ok(_) => return Ok(message),
                Err(err) if !is_missing_message(&err) => return Err(err),
                Err(_) => debug!("Dashboard {message} in {channel} is gone, sending a new one"),
            }
        }
        Ok(channel
            .send_message(
                (&self.cache, self.http.as_ref()),
                CreateMessage::new()
                    .embed(dashboard_embed(summary))
                    .components(dashboard_buttons()),
            )
            .await?
            .id)
    }
    async fn grant_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), SerenityError> {
        if !self.can_manage(guild, role) {
            debug!("Skipping grant of role {role} in guild {guild}: hierarchy too low");
            return Ok(());
        }
        self.http
            .add_member_role(guild, user, role, Some("Weekly flag quiz leader"))
            .await
    }
    async fn revoke_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), SerenityError> {
        if !self.can_manage(guild, role) {
            debug!("Skipping revoke of role {role} in guild {guild}: hierarchy too low");
            return Ok(());
        }
        self.http
            .remove_member_role(guild, user, role, Some("No longer the weekly flag quiz leader"))
            .await
    }
}
