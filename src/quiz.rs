//! The flag quiz round engine.
//!
//! Rounds live in a [`RoundRegistry`] keyed by guild, channel and user. Every
//! trigger (text answer, button press, timeout) resolves a round by claiming
//! it under the key's mutex, and only if the round id it observed is still the
//! registered one, so each round is resolved exactly once.

pub mod answer;
pub mod catalog;
pub mod gateway;
pub mod registry;
pub mod stats;

use self::{
    answer::is_correct_guess,
    catalog::{default_blacklist, Catalog},
    gateway::{DashboardSummary, Gateway, RoundPrompt, RoundReport, Verdict},
    registry::{ActiveRound, RoundKey, RoundRegistry},
    stats::{month_key, payout, week_key, FlagStats, Mode, PlayerStats},
};
use crate::{
    commands::CommandError,
    config::QuizConfig,
    constants::{EASY_OPTION_COUNT, TOP_FLAGS_MAX},
    database::{Database, GuildQuizSettings},
};
use ahash::HashSet;
use arc_swap::ArcSwap;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use poise::serenity_prelude::{
    ChannelId, Error as SerenityError, GuildId, Mentionable, MessageId, RoleId, UserId,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use sea_orm::DbErr;
use std::sync::Arc;
use thiserror::Error;
use tokio::time;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("database error: {0}")]
    CachedDatabase(#[from] Arc<DbErr>),
    #[error("discord error: {0}")]
    Discord(#[from] SerenityError),
}

impl From<QuizError> for CommandError {
    fn from(value: QuizError) -> Self {
        Self::Unexpected(value.into())
    }
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("The flag quiz is disabled on this server.")]
    Disabled,
    #[error("The flag quiz can only be played in <#{0}>.")]
    WrongChannel(ChannelId),
    #[error("You already have a running round in this channel.")]
    AlreadyPlaying,
    #[error("You already played today's daily flag. Come back tomorrow!")]
    DailyAlreadyPlayed,
    #[error("The wager must be between 1 and {0} points.")]
    InvalidWager(i64),
    #[error("You only have {available} points and can't wager {wager}.")]
    InsufficientPoints { available: i64, wager: i64 },
    #[error("There are no flags left to ask, check the blacklist.")]
    NoFlagsAvailable,
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

impl From<DbErr> for StartError {
    fn from(value: DbErr) -> Self {
        Self::Quiz(value.into())
    }
}

impl From<Arc<DbErr>> for StartError {
    fn from(value: Arc<DbErr>) -> Self {
        Self::Quiz(value.into())
    }
}

impl From<SerenityError> for StartError {
    fn from(value: SerenityError) -> Self {
        Self::Quiz(value.into())
    }
}

impl From<StartError> for CommandError {
    fn from(value: StartError) -> Self {
        match value {
            StartError::Quiz(err) => err.into(),
            _ => Self::Expected(value.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundStarted {
    pub round_id: u64,
    pub code: String,
    pub mode: Mode,
    pub wager: i64,
    pub options: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub prompt: MessageId,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub round_id: u64,
    pub code: String,
    pub mode: Mode,
    pub verdict: Verdict,
    pub points: i64,
    pub player: PlayerStats,
    pub flag: FlagStats,
    /// Streak milestones reached for the first time.
    pub unlocked: Vec<i64>,
}

#[derive(Debug, Clone)]
pub enum ButtonOutcome {
    Resolved(Resolution),
    NotYourRound,
    Expired,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInfo {
    pub code: String,
    pub name: String,
    pub flag_url: String,
    pub stats: FlagStats,
}

pub fn achievement_code(milestone: i64) -> String {
    format!("flag_streak_{milestone}")
}

/// Same code for every call with the same guild and day.
fn daily_code<'a>(pool: &[&'a str], guild: GuildId, day: NaiveDate) -> Option<&'a str> {
    let day = u64::try_from(day.num_days_from_ce()).unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(guild.get() ^ day.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    pool.choose(&mut rng).copied()
}

/// The correct code plus up to three distinct decoys, shuffled.
fn easy_options(catalog: &Catalog, code: &str, blacklist: &HashSet<String>) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let decoys = catalog
        .pool(blacklist)
        .into_iter()
        .filter(|candidate| *candidate != code)
        .collect::<Vec<_>>();
    let mut options = decoys
        .choose_multiple(&mut rng, EASY_OPTION_COUNT - 1)
        .map(|decoy| (*decoy).to_owned())
        .collect::<Vec<_>>();
    options.push(code.to_owned());
    options.shuffle(&mut rng);
    options
}

pub struct FlagQuiz {
    db: Arc<Database>,
    gateway: Arc<dyn Gateway>,
    registry: RoundRegistry,
    catalog: ArcSwap<Catalog>,
    config: QuizConfig,
}

impl FlagQuiz {
    pub fn new(db: Arc<Database>, gateway: Arc<dyn Gateway>, config: QuizConfig) -> Self {
        Self {
            db,
            gateway,
            registry: RoundRegistry::new(),
            catalog: ArcSwap::from_pointee(Catalog::builtin()),
            config,
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.load_full()
    }

    /// Replaces the builtin catalog with the downloaded one, if the download works.
    pub async fn load_catalog(&self) {
        match Catalog::fetch().await {
            Ok(catalog) => {
                info!("Loaded {} countries into the flag catalog", catalog.len());
                self.catalog.store(Arc::new(catalog));
            }
            Err(err) => warn!("Failed to fetch the country catalog, keeping the builtin one: {err}"),
        }
    }

    async fn load_player_stats(
        &self,
        guild: GuildId,
        user: UserId,
        today: NaiveDate,
    ) -> Result<PlayerStats, DbErr> {
        let mut stats = self
            .db
            .get_flag_player_stats(guild, user)
            .await?
            .unwrap_or_else(|| PlayerStats::new(today));
        stats.roll_over(today);
        Ok(stats)
    }

    fn pick_code(
        &self,
        catalog: &Catalog,
        guild: GuildId,
        mode: Mode,
        blacklist: &HashSet<String>,
        today: NaiveDate,
    ) -> Option<String> {
        let pool = catalog.pool(blacklist);
        if mode == Mode::Daily {
            return daily_code(&pool, guild, today).map(str::to_owned);
        }
        let recent = self.registry.recent(guild);
        let fresh = pool
            .iter()
            .copied()
            .filter(|code| !recent.iter().any(|recent| recent == code))
            .collect::<Vec<_>>();
        let candidates = if fresh.is_empty() { &pool } else { &fresh };
        candidates
            .choose(&mut rand::thread_rng())
            .map(|code| (*code).to_owned())
    }

    pub async fn start_round(
        self: &Arc<Self>,
        key: RoundKey,
        mode: Mode,
        wager: Option<i64>,
    ) -> Result<RoundStarted, StartError> {
        let settings = self.db.get_flag_quiz_guild(key.guild).await?;
        if !settings.enabled {
            return Err(StartError::Disabled);
        }
        if let Some(channel) = settings.channel.filter(|channel| *channel != key.channel) {
            return Err(StartError::WrongChannel(channel));
        }
        let wager = if mode == Mode::Bet {
            wager
                .filter(|wager| (1..=self.config.max_wager).contains(wager))
                .ok_or(StartError::InvalidWager(self.config.max_wager))?
        } else {
            0
        };

        let lock = self.registry.lock(key);
        let _guard = lock.lock().await;
        if self.registry.contains(key) {
            return Err(StartError::AlreadyPlaying);
        }
        let player_lock = self.registry.player_lock(key.guild, key.user);
        let _player_guard = player_lock.lock().await;
        let today = Utc::now().date_naive();
        let mut player = self.load_player_stats(key.guild, key.user, today).await?;
        if mode == Mode::Daily && player.played_daily_on(today) {
            return Err(StartError::DailyAlreadyPlayed);
        }
        if wager > player.total_points {
            return Err(StartError::InsufficientPoints {
                available: player.total_points,
                wager,
            });
        }

        let catalog = self.catalog();
        let blacklist = settings.blacklist.unwrap_or_else(default_blacklist);
        let code = self
            .pick_code(&catalog, key.guild, mode, &blacklist, today)
            .ok_or(StartError::NoFlagsAvailable)?;
        let options = if mode == Mode::Easy {
            easy_options(&catalog, &code, &blacklist)
        } else {
            Vec::new()
        };
        let mut flag = self
            .db
            .get_flag_stats(key.guild, &code)
            .await?
            .unwrap_or_default();
        flag.asked += 1;

        let round_id = self.registry.next_id();
        let time_limit = mode.time_limit(&self.config);
        let started_at = Utc::now();
        let expires_at = started_at
            + chrono::Duration::from_std(time_limit).unwrap_or_else(|_| chrono::Duration::zero());
        let prompt = RoundPrompt {
            user: key.user,
            round_id,
            mode,
            flag_url: catalog.flag_url(&code),
            expires_at,
            wager,
            flag,
            options: options
                .iter()
                .map(|option| (option.clone(), catalog.name_for(option).to_owned()))
                .collect(),
        };
        let message = self.gateway.send_prompt(key.channel, &prompt).await?;

        let persisted = async {
            match mode {
                Mode::Bet => {
                    player.stake(wager);
                    self.db
                        .upsert_flag_player_stats(key.guild, key.user, &player)
                        .await?;
                }
                // the daily flag is used up even if the answer is wrong
                Mode::Daily => {
                    player.last_daily = Some(today);
                    self.db
                        .upsert_flag_player_stats(key.guild, key.user, &player)
                        .await?;
                }
                Mode::Normal | Mode::Easy => {}
            }
            self.db
                .add_flag_stats(
                    key.guild,
                    &code,
                    FlagStats {
                        asked: 1,
                        ..FlagStats::default()
                    },
                )
                .await
        }
        .await;
        if let Err(err) = persisted {
            self.discard_message(key.channel, message).await;
            return Err(err.into());
        }

        self.registry
            .remember(key.guild, &code, self.config.recent_depth);
        let timeout = tokio::spawn({
            let quiz = Arc::clone(self);
            async move {
                time::sleep(time_limit).await;
                quiz.expire(key, round_id).await;
            }
        })
        .abort_handle();
        self.registry.insert(
            key,
            ActiveRound {
                id: round_id,
                mode,
                code: code.clone(),
                answers: catalog.answers_for(&code),
                wager,
                started_at,
                prompt: message,
                timeout: Some(timeout),
            },
        );
        debug!(
            "Started {mode} round {round_id} for user {} in channel {}",
            key.user, key.channel
        );
        Ok(RoundStarted {
            round_id,
            code,
            mode,
            wager,
            options,
            expires_at,
            prompt: message,
        })
    }

    /// Evaluates a chat message against the author's round in that channel.
    /// Messages are ignored while the quiz is disabled or outside the quiz
    /// channel, so such rounds can only time out.
    pub async fn handle_text_answer(
        &self,
        key: RoundKey,
        content: &str,
    ) -> Result<Option<Resolution>, QuizError> {
        let content = content.trim();
        if content.is_empty() || content.starts_with('!') {
            return Ok(None);
        }
        let Some((round_id, correct)) = self.registry.inspect(key, |round| {
            (round.id, is_correct_guess(content, &round.code, &round.answers))
        }) else {
            return Ok(None);
        };
        let settings = self.db.get_flag_quiz_guild(key.guild).await?;
        if !settings.enabled || settings.channel.is_some_and(|channel| channel != key.channel) {
            return Ok(None);
        }
        let verdict = if correct {
            Verdict::Correct
        } else {
            Verdict::Wrong
        };
        self.resolve(key, round_id, verdict).await
    }

    /// `key` belongs to the round owner encoded in the button.
    pub async fn handle_easy_button(
        &self,
        key: RoundKey,
        presser: UserId,
        round_id: u64,
        code: &str,
    ) -> Result<ButtonOutcome, QuizError> {
        if presser != key.user {
            return Ok(ButtonOutcome::NotYourRound);
        }
        if !self.db.get_flag_quiz_guild(key.guild).await?.enabled {
            return Ok(ButtonOutcome::Disabled);
        }
        let Some(correct) = self
            .registry
            .inspect(key, |round| {
                (round.id == round_id).then(|| round.code.eq_ignore_ascii_case(code))
            })
            .flatten()
        else {
            return Ok(ButtonOutcome::Expired);
        };
        let verdict = if correct {
            Verdict::Correct
        } else {
            Verdict::Wrong
        };
        Ok(self
            .resolve(key, round_id, verdict)
            .await?
            .map_or(ButtonOutcome::Expired, ButtonOutcome::Resolved))
    }

    async fn expire(&self, key: RoundKey, round_id: u64) {
        match self.resolve(key, round_id, Verdict::TimedOut).await {
            Ok(Some(_)) => debug!("Round {round_id} timed out"),
            Ok(None) => {}
            Err(err) => error!("Failed to resolve timed out round {round_id}: {err}"),
        }
    }

    async fn resolve(
        &self,
        key: RoundKey,
        round_id: u64,
        verdict: Verdict,
    ) -> Result<Option<Resolution>, QuizError> {
        let lock = self.registry.lock(key);
        let guard = lock.lock().await;
        let Some(round) = self.registry.take(key, round_id) else {
            debug!("Round {round_id} was already resolved");
            return Ok(None);
        };
        if verdict != Verdict::TimedOut {
            round.cancel_timeout();
        }
        debug!(
            "Round {round_id} ended as {verdict:?} after {}s",
            (Utc::now() - round.started_at).num_seconds()
        );

        let player_lock = self.registry.player_lock(key.guild, key.user);
        let player_guard = player_lock.lock().await;
        let today = Utc::now().date_naive();
        let mut player = self.load_player_stats(key.guild, key.user, today).await?;
        let mut delta = FlagStats::default();
        let points = if verdict == Verdict::Correct {
            let points = payout(round.mode, round.wager, &self.config);
            player.record_correct(points);
            if round.mode == Mode::Daily {
                player.last_daily = Some(today);
            }
            delta.correct = 1;
            points
        } else {
            player.record_wrong();
            delta.wrong = 1;
            0
        };
        self.db
            .upsert_flag_player_stats(key.guild, key.user, &player)
            .await?;
        drop(player_guard);
        let flag = self
            .db
            .add_flag_stats(key.guild, &round.code, delta)
            .await?;
        let unlocked = if verdict == Verdict::Correct {
            self.unlock_milestones(key, player.current_streak).await
        } else {
            Vec::new()
        };
        drop(guard);

        let resolution = Resolution {
            round_id,
            code: round.code.clone(),
            mode: round.mode,
            verdict,
            points,
            player,
            flag,
            unlocked,
        };
        self.publish_resolution(key, &round, &resolution).await;
        Ok(Some(resolution))
    }

    async fn unlock_milestones(&self, key: RoundKey, streak: i64) -> Vec<i64> {
        let mut unlocked = Vec::new();
        for milestone in self
            .config
            .streak_milestones
            .iter()
            .copied()
            .filter(|milestone| *milestone <= streak)
        {
            match self
                .db
                .add_achievement(key.guild, key.user, &achievement_code(milestone))
                .await
            {
                Ok(true) => unlocked.push(milestone),
                Ok(false) => {}
                Err(err) => warn!(
                    "Failed to store streak achievement {milestone} for user {}: {err}",
                    key.user
                ),
            }
        }
        unlocked
    }

    /// Cosmetic follow-ups of a resolution. Failures are logged only.
    async fn publish_resolution(
        &self,
        key: RoundKey,
        round: &ActiveRound,
        resolution: &Resolution,
    ) {
        let catalog = self.catalog();
        let report = RoundReport {
            user: key.user,
            mode: round.mode,
            verdict: resolution.verdict,
            code: round.code.clone(),
            name: catalog.name_for(&round.code).to_owned(),
            flag_url: catalog.flag_url(&round.code),
            points: resolution.points,
            wager: round.wager,
            total_points: resolution.player.total_points,
            streak: resolution.player.current_streak,
            flag: resolution.flag,
        };
        if let Err(err) = self.gateway.send_result(key.channel, &report).await {
            warn!("Failed to send the result of round {}: {err}", round.id);
        }
        self.discard_message(key.channel, round.prompt).await;
        for milestone in &resolution.unlocked {
            let content = format!(
                "{} reached a streak of **{milestone}** and unlocked `{}`!",
                key.user.mention(),
                achievement_code(*milestone)
            );
            if let Err(err) = self.gateway.announce(key.channel, content).await {
                warn!("Failed to announce streak achievement {milestone}: {err}");
            }
        }
        if let Err(err) = self.refresh_dashboard(key.guild).await {
            warn!("Failed to refresh the dashboard of guild {}: {err}", key.guild);
        }
        if let Err(err) = self.sync_weekly_leader(key.guild).await {
            warn!("Failed to sync the weekly leader of guild {}: {err}", key.guild);
        }
    }

    async fn discard_message(&self, channel: ChannelId, message: MessageId) {
        if let Err(err) = self.gateway.delete_message(channel, message).await {
            warn!("Failed to delete message {message} in channel {channel}: {err}");
        }
    }

    pub async fn dashboard_summary(&self, guild: GuildId) -> Result<DashboardSummary, QuizError> {
        let settings = self.db.get_flag_quiz_guild(guild).await?;
        Ok(DashboardSummary {
            players: self.db.count_flag_players(guild).await?,
            rounds: self.db.sum_flag_rounds(guild).await?,
            best_streak: self.db.best_flag_streak(guild).await?,
            leader: self
                .db
                .list_flag_players_top_points(guild, 1)
                .await?
                .first()
                .copied(),
            enabled: settings.enabled,
        })
    }

    /// Edits the dashboard in the quiz channel, or sends it if it is missing.
    /// Returns `None` when no quiz channel is set.
    pub async fn refresh_dashboard(&self, guild: GuildId) -> Result<Option<MessageId>, QuizError> {
        self.upsert_dashboard(guild, false).await
    }

    /// Sends a new dashboard to the quiz channel and deletes the previous one.
    pub async fn post_dashboard(&self, guild: GuildId) -> Result<Option<MessageId>, QuizError> {
        self.upsert_dashboard(guild, true).await
    }

    async fn upsert_dashboard(
        &self,
        guild: GuildId,
        fresh: bool,
    ) -> Result<Option<MessageId>, QuizError> {
        let settings = self.db.get_flag_quiz_guild(guild).await?;
        let Some(channel) = settings.channel else {
            return Ok(None);
        };
        let summary = self.dashboard_summary(guild).await?;
        let previous = settings.dashboard_message;
        let message = self
            .gateway
            .upsert_dashboard(channel, previous.filter(|_| !fresh), &summary)
            .await?;
        if previous != Some(message) {
            self.db
                .set_flag_quiz_dashboard_message(guild, message)
                .await?;
            if let Some(previous) = previous.filter(|_| fresh) {
                self.discard_message(channel, previous).await;
            }
        }
        Ok(Some(message))
    }

    /// Moves the weekly leader role to the current weekly leader.
    pub async fn sync_weekly_leader(&self, guild: GuildId) -> Result<(), QuizError> {
        let settings = self.db.get_flag_quiz_guild(guild).await?;
        let Some(role) = settings.leader_role else {
            return Ok(());
        };
        let week = week_key(Utc::now().date_naive());
        let leader = self
            .db
            .list_flag_players_top_points_weekly(guild, &week, 1)
            .await?
            .first()
            .map(|(user, _)| *user);
        if leader == settings.leader_user {
            return Ok(());
        }
        if let Some(previous) = settings.leader_user {
            if let Err(err) = self.gateway.revoke_role(guild, previous, role).await {
                warn!("Failed to revoke the leader role from user {previous}: {err}");
            }
        }
        if let Some(leader) = leader {
            self.gateway.grant_role(guild, leader, role).await?;
            info!("User {leader} is the new weekly flag quiz leader of guild {guild}");
        }
        self.db.set_flag_quiz_leader_user(guild, leader).await?;
        Ok(())
    }

    pub async fn setup_channel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Option<MessageId>, QuizError> {
        self.db.set_flag_quiz_channel(guild, channel).await?;
        self.post_dashboard(guild).await
    }

    pub async fn set_enabled(&self, guild: GuildId, enabled: bool) -> Result<(), QuizError> {
        self.db.set_flag_quiz_enabled(guild, enabled).await?;
        if let Err(err) = self.refresh_dashboard(guild).await {
            warn!("Failed to refresh the dashboard of guild {guild}: {err}");
        }
        Ok(())
    }

    /// `None` restores the default blacklist.
    pub async fn set_blacklist(
        &self,
        guild: GuildId,
        blacklist: Option<&HashSet<String>>,
    ) -> Result<(), QuizError> {
        Ok(self.db.set_flag_quiz_blacklist(guild, blacklist).await?)
    }

    pub async fn set_leader_role(
        &self,
        guild: GuildId,
        role: Option<RoleId>,
    ) -> Result<(), QuizError> {
        let settings = self.db.get_flag_quiz_guild(guild).await?;
        if let (Some(old), Some(holder)) = (settings.leader_role, settings.leader_user) {
            if Some(old) != role {
                if let Err(err) = self.gateway.revoke_role(guild, holder, old).await {
                    warn!("Failed to revoke the old leader role from user {holder}: {err}");
                }
            }
        }
        self.db.set_flag_quiz_leader_role(guild, role).await?;
        self.sync_weekly_leader(guild).await
    }

    pub async fn settings(
        &self,
        guild: GuildId,
    ) -> Result<GuildQuizSettings, QuizError> {
        Ok(self.db.get_flag_quiz_guild(guild).await?)
    }

    pub async fn leaderboard(
        &self,
        guild: GuildId,
        period: Period,
        limit: u64,
    ) -> Result<Vec<(UserId, i64)>, QuizError> {
        let today = Utc::now().date_naive();
        let rows = match period {
            Period::Weekly => {
                self.db
                    .list_flag_players_top_points_weekly(guild, &week_key(today), limit)
                    .await?
            }
            Period::Monthly => {
                self.db
                    .list_flag_players_top_points_monthly(guild, &month_key(today), limit)
                    .await?
            }
            Period::AllTime => self.db.list_flag_players_top_points(guild, limit).await?,
        };
        Ok(rows)
    }

    pub async fn streak_leaderboard(
        &self,
        guild: GuildId,
        limit: u64,
    ) -> Result<Vec<(UserId, i64, i64)>, QuizError> {
        Ok(self.db.list_flag_players_top_streak(guild, limit).await?)
    }

    /// Stats as of today, stale weekly or monthly points read as zero.
    pub async fn stats_for(&self, guild: GuildId, user: UserId) -> Result<PlayerStats, QuizError> {
        Ok(self
            .load_player_stats(guild, user, Utc::now().date_naive())
            .await?)
    }

    pub async fn achievements_for(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Vec<String>, QuizError> {
        Ok(self.db.list_achievements(guild, user).await?)
    }

    /// Looks up a flag by code, name or alias.
    pub async fn flag_info(&self, guild: GuildId, query: &str) -> Result<Option<FlagInfo>, QuizError> {
        let catalog = self.catalog();
        let Some(code) = catalog.resolve(query) else {
            return Ok(None);
        };
        let stats = self
            .db
            .get_flag_stats(guild, code)
            .await?
            .unwrap_or_default();
        Ok(Some(FlagInfo {
            code: code.to_owned(),
            name: catalog.name_for(code).to_owned(),
            flag_url: catalog.flag_url(code),
            stats,
        }))
    }

    pub async fn top_flags(&self, guild: GuildId, limit: u64) -> Result<Vec<FlagInfo>, QuizError> {
        let catalog = self.catalog();
        Ok(self
            .db
            .list_flag_stats_top_asked(guild, limit.clamp(1, TOP_FLAGS_MAX))
            .await?
            .into_iter()
            .map(|(code, stats)| FlagInfo {
                name: catalog.name_for(&code).to_owned(),
                flag_url: catalog.flag_url(&code),
                code,
                stats,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        gateway::mock::{Event, RecordingGateway},
        *,
    };
    use crate::database::tests::memory_db;
    use std::{sync::atomic::Ordering, time::Duration};

    const GUILD: GuildId = GuildId::new(1);
    const CHANNEL: ChannelId = ChannelId::new(2);

    fn key(user: u64) -> RoundKey {
        RoundKey {
            guild: GUILD,
            channel: CHANNEL,
            user: UserId::new(user),
        }
    }

    async fn quiz_with(config: QuizConfig) -> (Arc<FlagQuiz>, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        let quiz = FlagQuiz::new(Arc::new(memory_db().await), gateway.clone(), config);
        (Arc::new(quiz), gateway)
    }

    async fn quiz() -> (Arc<FlagQuiz>, Arc<RecordingGateway>) {
        quiz_with(QuizConfig::default()).await
    }

    async fn seed(quiz: &FlagQuiz, user: u64, stats: PlayerStats) {
        quiz.db
            .upsert_flag_player_stats(GUILD, UserId::new(user), &stats)
            .await
            .unwrap();
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn play(quiz: &Arc<FlagQuiz>, user: u64, correct: bool) -> Resolution {
        let started = quiz.start_round(key(user), Mode::Normal, None).await.unwrap();
        let guess = if correct { started.code.as_str() } else { "qqqq" };
        quiz.handle_text_answer(key(user), guess)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn correct_answer_pays_out_and_cleans_up() {
        let (quiz, gateway) = quiz().await;
        let started = quiz.start_round(key(5), Mode::Normal, None).await.unwrap();
        assert!(quiz.registry.contains(key(5)));
        let resolution = quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.verdict, Verdict::Correct);
        assert_eq!(resolution.points, 10);
        assert!(!quiz.registry.contains(key(5)));

        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!(
            (stats.total_points, stats.weekly_points, stats.monthly_points),
            (10, 10, 10)
        );
        assert_eq!((stats.correct, stats.current_streak, stats.best_streak), (1, 1, 1));
        let flag = quiz.db.get_flag_stats(GUILD, &started.code).await.unwrap().unwrap();
        assert_eq!((flag.asked, flag.correct, flag.wrong), (1, 1, 0));

        let events = gateway.events();
        assert!(events.contains(&Event::Result {
            user: UserId::new(5),
            verdict: Verdict::Correct,
            points: 10,
        }));
        assert!(events.contains(&Event::Delete(started.prompt)));
    }

    #[tokio::test]
    async fn ignored_messages_leave_the_round_running() {
        let (quiz, _) = quiz().await;
        let started = quiz.start_round(key(5), Mode::Normal, None).await.unwrap();
        let prefixed = format!("!{}", started.code);
        for content in ["", "   ", prefixed.as_str()] {
            assert!(quiz.handle_text_answer(key(5), content).await.unwrap().is_none());
        }
        // another user, and the same user in another channel
        assert!(quiz
            .handle_text_answer(key(6), &started.code)
            .await
            .unwrap()
            .is_none());
        let elsewhere = RoundKey {
            channel: ChannelId::new(99),
            ..key(5)
        };
        assert!(quiz
            .handle_text_answer(elsewhere, &started.code)
            .await
            .unwrap()
            .is_none());
        assert!(quiz.registry.contains(key(5)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_triggers_resolve_exactly_once() {
        let (quiz, gateway) = quiz().await;
        let started = quiz.start_round(key(5), Mode::Easy, None).await.unwrap();
        let mut tasks = Vec::new();
        for guess in 0..8 {
            let quiz = Arc::clone(&quiz);
            let code = if guess % 2 == 0 {
                started.code.clone()
            } else {
                "qqqq".to_owned()
            };
            tasks.push(tokio::spawn(async move {
                quiz.handle_text_answer(key(5), &code).await.unwrap().is_some()
            }));
        }
        for option in started.options.clone() {
            let quiz = Arc::clone(&quiz);
            let round_id = started.round_id;
            tasks.push(tokio::spawn(async move {
                matches!(
                    quiz.handle_easy_button(key(5), UserId::new(5), round_id, &option)
                        .await
                        .unwrap(),
                    ButtonOutcome::Resolved(_)
                )
            }));
        }
        tasks.push(tokio::spawn({
            let quiz = Arc::clone(&quiz);
            async move {
                quiz.expire(key(5), started.round_id).await;
                false
            }
        }));
        let mut resolved = 0;
        for task in tasks {
            resolved += usize::from(task.await.unwrap());
        }
        assert!(resolved <= 1);
        assert_eq!(gateway.results().len(), 1);
        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!(stats.rounds(), 1);
        let flag = quiz.db.get_flag_stats(GUILD, &started.code).await.unwrap().unwrap();
        assert_eq!(flag.correct + flag.wrong, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn shared_flag_counts_every_player() {
        let (quiz, _) = quiz().await;
        let mut code = String::new();
        for user in 1..=40 {
            code = quiz.start_round(key(user), Mode::Daily, None).await.unwrap().code;
        }
        let mut tasks = Vec::new();
        for user in 1..=40 {
            let quiz = Arc::clone(&quiz);
            let code = code.clone();
            tasks.push(tokio::spawn(async move {
                quiz.handle_text_answer(key(user), &code).await.unwrap().is_some()
            }));
        }
        let mut resolved = 0;
        for task in tasks {
            resolved += i64::from(task.await.unwrap());
        }
        assert_eq!(resolved, 40);
        let flag = quiz.db.get_flag_stats(GUILD, &code).await.unwrap().unwrap();
        assert_eq!((flag.asked, flag.correct, flag.wrong), (40, 40, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn rounds_in_many_channels_all_count() {
        let (quiz, _) = quiz().await;
        let mut rounds = Vec::new();
        for channel in 100..120 {
            let key = RoundKey {
                channel: ChannelId::new(channel),
                ..key(5)
            };
            let started = quiz.start_round(key, Mode::Normal, None).await.unwrap();
            rounds.push((key, started.code));
        }
        let mut tasks = Vec::new();
        for (key, code) in rounds {
            let quiz = Arc::clone(&quiz);
            tasks.push(tokio::spawn(async move {
                quiz.handle_text_answer(key, &code).await.unwrap().is_some()
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap());
        }
        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!((stats.correct, stats.wrong), (20, 0));
        assert_eq!(stats.total_points, 200);
        assert_eq!((stats.current_streak, stats.best_streak), (20, 20));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_starts_yield_one_round() {
        let (quiz, gateway) = quiz().await;
        let (first, second) = tokio::join!(
            quiz.start_round(key(5), Mode::Normal, None),
            quiz.start_round(key(5), Mode::Normal, None)
        );
        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|outcome| matches!(outcome, Err(StartError::AlreadyPlaying))));
        let prompts = gateway
            .events()
            .into_iter()
            .filter(|event| matches!(event, Event::Prompt { .. }))
            .count();
        assert_eq!(prompts, 1);
    }

    #[tokio::test]
    async fn timeout_counts_as_wrong() {
        let (quiz, gateway) = quiz_with(QuizConfig {
            time_limit: Duration::from_millis(50),
            ..QuizConfig::default()
        })
        .await;
        seed(
            &quiz,
            5,
            PlayerStats {
                current_streak: 3,
                best_streak: 3,
                ..PlayerStats::new(today())
            },
        )
        .await;
        quiz.start_round(key(5), Mode::Normal, None).await.unwrap();
        time::sleep(Duration::from_millis(800)).await;
        assert!(!quiz.registry.contains(key(5)));
        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!((stats.wrong, stats.current_streak, stats.best_streak), (1, 0, 3));
        assert_eq!(
            gateway.results(),
            [Event::Result {
                user: UserId::new(5),
                verdict: Verdict::TimedOut,
                points: 0,
            }]
        );
    }

    #[tokio::test]
    async fn answered_round_is_not_timed_out_later() {
        let (quiz, gateway) = quiz_with(QuizConfig {
            time_limit: Duration::from_millis(100),
            ..QuizConfig::default()
        })
        .await;
        play(&quiz, 5, true).await;
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(gateway.results().len(), 1);
        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!((stats.correct, stats.wrong), (1, 0));
    }

    #[tokio::test]
    async fn stale_round_id_cannot_resolve_a_newer_round() {
        let (quiz, _) = quiz().await;
        let old = play(&quiz, 5, false).await;
        let started = quiz.start_round(key(5), Mode::Normal, None).await.unwrap();
        assert_ne!(old.round_id, started.round_id);
        quiz.expire(key(5), old.round_id).await;
        assert!(quiz.registry.contains(key(5)));
        let outcome = quiz
            .handle_easy_button(key(5), UserId::new(5), old.round_id, &started.code)
            .await
            .unwrap();
        assert!(matches!(outcome, ButtonOutcome::Expired));
        assert!(quiz.registry.contains(key(5)));
    }

    #[tokio::test]
    async fn wrong_answer_resets_the_streak() {
        let (quiz, _) = quiz().await;
        play(&quiz, 5, true).await;
        play(&quiz, 5, true).await;
        let resolution = play(&quiz, 5, false).await;
        assert_eq!(resolution.verdict, Verdict::Wrong);
        assert_eq!(resolution.points, 0);
        assert_eq!(resolution.player.current_streak, 0);
        assert_eq!(resolution.player.best_streak, 2);
        assert_eq!(resolution.player.total_points, 20);
    }

    #[tokio::test]
    async fn daily_is_used_up_at_start_even_if_answered_wrong() {
        let (quiz, _) = quiz().await;
        quiz.start_round(key(5), Mode::Daily, None).await.unwrap();
        // stamped before any answer, so a miss or a timeout still uses up the day
        let started = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert!(started.played_daily_on(today()));
        quiz.handle_text_answer(key(5), "qqqq").await.unwrap().unwrap();
        let before = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert!(before.played_daily_on(today()));
        assert!(matches!(
            quiz.start_round(key(5), Mode::Daily, None).await,
            Err(StartError::DailyAlreadyPlayed)
        ));
        assert_eq!(quiz.stats_for(GUILD, UserId::new(5)).await.unwrap(), before);
        assert!(!quiz.registry.contains(key(5)));
    }

    #[tokio::test]
    async fn daily_pays_the_daily_reward() {
        let (quiz, _) = quiz().await;
        let started = quiz.start_round(key(5), Mode::Daily, None).await.unwrap();
        let resolution = quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.points, 25);
        assert_eq!(resolution.player.last_daily, Some(today()));
    }

    #[test]
    fn daily_code_is_stable_per_guild_and_day() {
        let pool = ["AR", "DE", "FR", "IT", "JP"];
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let code = daily_code(&pool, GUILD, day).unwrap();
        assert_eq!(daily_code(&pool, GUILD, day), Some(code));
        assert!(pool.contains(&code));
        assert_eq!(daily_code(&[], GUILD, day), None);
    }

    #[tokio::test]
    async fn bet_stakes_up_front_and_pays_double() {
        let (quiz, _) = quiz().await;
        seed(
            &quiz,
            5,
            PlayerStats {
                total_points: 50,
                ..PlayerStats::new(today())
            },
        )
        .await;
        let started = quiz.start_round(key(5), Mode::Bet, Some(20)).await.unwrap();
        assert_eq!(started.wager, 20);
        let staked = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!(staked.total_points, 30);
        let resolution = quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.points, 40);
        assert_eq!(resolution.player.total_points, 70);
    }

    #[tokio::test]
    async fn lost_bet_keeps_the_wager() {
        let (quiz, _) = quiz().await;
        seed(
            &quiz,
            5,
            PlayerStats {
                total_points: 50,
                ..PlayerStats::new(today())
            },
        )
        .await;
        quiz.start_round(key(5), Mode::Bet, Some(50)).await.unwrap();
        let resolution = quiz.handle_text_answer(key(5), "qqqq").await.unwrap().unwrap();
        assert_eq!(resolution.player.total_points, 0);
    }

    #[tokio::test]
    async fn invalid_wagers_are_rejected_without_side_effects() {
        let (quiz, gateway) = quiz().await;
        seed(
            &quiz,
            5,
            PlayerStats {
                total_points: 50,
                ..PlayerStats::new(today())
            },
        )
        .await;
        let max = QuizConfig::default().max_wager;
        for wager in [None, Some(0), Some(-5), Some(max + 1)] {
            assert!(matches!(
                quiz.start_round(key(5), Mode::Bet, wager).await,
                Err(StartError::InvalidWager(_))
            ));
        }
        assert!(matches!(
            quiz.start_round(key(5), Mode::Bet, Some(60)).await,
            Err(StartError::InsufficientPoints {
                available: 50,
                wager: 60
            })
        ));
        assert!(gateway.events().is_empty());
        assert_eq!(
            quiz.stats_for(GUILD, UserId::new(5))
                .await
                .unwrap()
                .total_points,
            50
        );
    }

    #[tokio::test]
    async fn stale_periods_read_as_zero() {
        let (quiz, _) = quiz().await;
        seed(
            &quiz,
            5,
            PlayerStats {
                total_points: 80,
                weekly_points: 30,
                weekly_key: "2000-W01".into(),
                monthly_points: 50,
                monthly_key: "2000-01".into(),
                ..PlayerStats::default()
            },
        )
        .await;
        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!(stats.total_points, 80);
        assert_eq!((stats.weekly_points, stats.monthly_points), (0, 0));
        assert_eq!(stats.weekly_key, week_key(today()));
        assert!(quiz
            .leaderboard(GUILD, Period::Weekly, 10)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            quiz.leaderboard(GUILD, Period::AllTime, 10).await.unwrap(),
            [(UserId::new(5), 80)]
        );
    }

    #[tokio::test]
    async fn configuration_gates_starting() {
        let (quiz, _) = quiz().await;
        quiz.set_enabled(GUILD, false).await.unwrap();
        assert!(matches!(
            quiz.start_round(key(5), Mode::Normal, None).await,
            Err(StartError::Disabled)
        ));
        quiz.set_enabled(GUILD, true).await.unwrap();
        quiz.setup_channel(GUILD, ChannelId::new(77)).await.unwrap();
        assert!(matches!(
            quiz.start_round(key(5), Mode::Normal, None).await,
            Err(StartError::WrongChannel(channel)) if channel == ChannelId::new(77)
        ));
        let in_quiz_channel = RoundKey {
            channel: ChannelId::new(77),
            ..key(5)
        };
        assert!(quiz.start_round(in_quiz_channel, Mode::Normal, None).await.is_ok());
    }

    #[tokio::test]
    async fn answers_need_an_enabled_quiz_in_its_channel() {
        let (quiz, _) = quiz().await;
        let started = quiz.start_round(key(5), Mode::Easy, None).await.unwrap();

        quiz.set_enabled(GUILD, false).await.unwrap();
        assert!(quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .is_none());
        let outcome = quiz
            .handle_easy_button(key(5), UserId::new(5), started.round_id, &started.code)
            .await
            .unwrap();
        assert!(matches!(outcome, ButtonOutcome::Disabled));
        assert!(quiz.registry.contains(key(5)));

        quiz.set_enabled(GUILD, true).await.unwrap();
        quiz.setup_channel(GUILD, ChannelId::new(77)).await.unwrap();
        assert!(quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .is_none());
        assert!(quiz.registry.contains(key(5)));

        quiz.setup_channel(GUILD, CHANNEL).await.unwrap();
        let resolution = quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.verdict, Verdict::Correct);
    }

    #[tokio::test]
    async fn failed_prompt_leaves_no_trace() {
        let (quiz, gateway) = quiz().await;
        gateway.fail_prompts.store(true, Ordering::SeqCst);
        assert!(matches!(
            quiz.start_round(key(5), Mode::Normal, None).await,
            Err(StartError::Quiz(QuizError::Discord(_)))
        ));
        assert!(!quiz.registry.contains(key(5)));
        assert!(quiz
            .top_flags(GUILD, 20)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn cosmetic_failures_do_not_block_persistence() {
        let (quiz, gateway) = quiz().await;
        quiz.setup_channel(GUILD, CHANNEL).await.unwrap();
        quiz.set_leader_role(GUILD, Some(RoleId::new(40))).await.unwrap();
        let started = quiz.start_round(key(5), Mode::Normal, None).await.unwrap();
        gateway.fail_cosmetics.store(true, Ordering::SeqCst);
        let resolution = quiz
            .handle_text_answer(key(5), &started.code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.verdict, Verdict::Correct);
        let stats = quiz.stats_for(GUILD, UserId::new(5)).await.unwrap();
        assert_eq!(stats.total_points, 10);
        // the grant failed, so the holder is not recorded
        assert_eq!(quiz.settings(GUILD).await.unwrap().leader_user, None);
    }

    #[tokio::test]
    async fn streak_achievements_unlock_once() {
        let (quiz, gateway) = quiz().await;
        seed(
            &quiz,
            5,
            PlayerStats {
                current_streak: 4,
                best_streak: 4,
                ..PlayerStats::new(today())
            },
        )
        .await;
        let resolution = play(&quiz, 5, true).await;
        assert_eq!(resolution.unlocked, [5]);
        let resolution = play(&quiz, 5, true).await;
        assert!(resolution.unlocked.is_empty());
        assert_eq!(
            quiz.achievements_for(GUILD, UserId::new(5)).await.unwrap(),
            ["flag_streak_5"]
        );
        let announcements = gateway
            .events()
            .into_iter()
            .filter(|event| matches!(event, Event::Announce(_)))
            .count();
        assert_eq!(announcements, 1);
    }

    #[tokio::test]
    async fn leader_role_follows_the_weekly_leader() {
        let (quiz, gateway) = quiz().await;
        let role = RoleId::new(40);
        quiz.set_leader_role(GUILD, Some(role)).await.unwrap();
        play(&quiz, 5, true).await;
        play(&quiz, 5, true).await;
        let grants = |events: &[Event]| {
            events
                .iter()
                .filter(|event| matches!(event, Event::Grant(..) | Event::Revoke(..)))
                .cloned()
                .collect::<Vec<_>>()
        };
        assert_eq!(
            grants(&gateway.events()),
            [Event::Grant(UserId::new(5), role)]
        );

        seed(
            &quiz,
            6,
            PlayerStats {
                total_points: 100,
                weekly_points: 100,
                ..PlayerStats::new(today())
            },
        )
        .await;
        play(&quiz, 6, false).await;
        assert_eq!(
            grants(&gateway.events()),
            [
                Event::Grant(UserId::new(5), role),
                Event::Revoke(UserId::new(5), role),
                Event::Grant(UserId::new(6), role),
            ]
        );
        assert_eq!(
            quiz.settings(GUILD).await.unwrap().leader_user,
            Some(UserId::new(6))
        );
    }

    #[tokio::test]
    async fn recent_codes_are_avoided_until_the_pool_runs_dry() {
        let (quiz, _) = quiz_with(QuizConfig {
            recent_depth: 1,
            ..QuizConfig::default()
        })
        .await;
        let catalog = quiz.catalog();
        let keep = |codes: &[&str]| {
            catalog
                .pool(&HashSet::default())
                .into_iter()
                .filter(|code| !codes.contains(code))
                .map(str::to_owned)
                .collect::<HashSet<_>>()
        };
        quiz.set_blacklist(GUILD, Some(&keep(&["DE", "FR"])))
            .await
            .unwrap();
        let first = play(&quiz, 5, false).await.code;
        let second = play(&quiz, 5, false).await.code;
        let third = play(&quiz, 5, false).await.code;
        assert_ne!(first, second);
        assert_eq!(first, third);

        quiz.set_blacklist(GUILD, Some(&keep(&["DE"]))).await.unwrap();
        assert_eq!(play(&quiz, 5, false).await.code, "DE");
        assert_eq!(play(&quiz, 5, false).await.code, "DE");

        quiz.set_blacklist(GUILD, Some(&keep(&[]))).await.unwrap();
        assert!(matches!(
            quiz.start_round(key(5), Mode::Normal, None).await,
            Err(StartError::NoFlagsAvailable)
        ));
    }

    #[tokio::test]
    async fn easy_buttons_belong_to_their_owner() {
        let (quiz, _) = quiz().await;
        let started = quiz.start_round(key(5), Mode::Easy, None).await.unwrap();
        assert_eq!(started.options.len(), EASY_OPTION_COUNT);
        assert!(started.options.contains(&started.code));
        let decoy = started
            .options
            .iter()
            .find(|option| **option != started.code)
            .unwrap();

        let outcome = quiz
            .handle_easy_button(key(5), UserId::new(6), started.round_id, &started.code)
            .await
            .unwrap();
        assert!(matches!(outcome, ButtonOutcome::NotYourRound));
        assert!(quiz.registry.contains(key(5)));

        let outcome = quiz
            .handle_easy_button(key(5), UserId::new(5), started.round_id, decoy)
            .await
            .unwrap();
        let ButtonOutcome::Resolved(resolution) = outcome else {
            panic!("round should resolve");
        };
        assert_eq!(resolution.verdict, Verdict::Wrong);

        let outcome = quiz
            .handle_easy_button(key(5), UserId::new(5), started.round_id, &started.code)
            .await
            .unwrap();
        assert!(matches!(outcome, ButtonOutcome::Expired));
    }

    #[tokio::test]
    async fn flag_queries_use_the_catalog() {
        let (quiz, _) = quiz().await;
        let info = quiz.flag_info(GUILD, "deutschland").await.unwrap().unwrap();
        assert_eq!(info.code, "DE");
        assert_eq!(info.name, "Germany");
        assert_eq!(info.stats, FlagStats::default());
        assert!(quiz.flag_info(GUILD, "atlantis").await.unwrap().is_none());

        let code = play(&quiz, 5, true).await.code;
        let top = quiz.top_flags(GUILD, 0).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].code, code);
        assert_eq!(top[0].stats.asked, 1);
    }

    #[tokio::test]
    async fn dashboard_is_posted_and_then_edited() {
        let (quiz, gateway) = quiz().await;
        assert_eq!(quiz.refresh_dashboard(GUILD).await.unwrap(), None);
        let posted = quiz.setup_channel(GUILD, CHANNEL).await.unwrap().unwrap();
        play(&quiz, 5, true).await;
        assert_eq!(quiz.refresh_dashboard(GUILD).await.unwrap(), Some(posted));
        let summary = quiz.dashboard_summary(GUILD).await.unwrap();
        assert_eq!(summary.players, 1);
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.leader, Some((UserId::new(5), 10)));
        assert!(gateway
            .events()
            .contains(&Event::Dashboard(summary.clone())));

        let reposted = quiz.post_dashboard(GUILD).await.unwrap().unwrap();
        assert_ne!(reposted, posted);
        assert!(gateway.events().contains(&Event::Delete(posted)));
    }
}
