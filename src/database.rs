#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::{
    commands::CommandError,
    quiz::{
        catalog::parse_blacklist,
        stats::{FlagStats, PlayerStats},
    },
};
use ahash::{HashSet, RandomState};
use entities::{achievement, flag_player, flag_quiz_guild, flag_stat, prelude::*};
use migration::{Migrator, MigratorTrait};
use moka::future::Cache;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId, UserId};
use sea_orm::{
    prelude::*,
    sea_query::{Expr, OnConflict},
    ActiveValue::Set,
    QueryOrder, QuerySelect,
};
use std::sync::Arc;

impl From<DbErr> for CommandError {
    fn from(value: DbErr) -> Self {
        Self::Unexpected(value.into())
    }
}

impl From<Arc<DbErr>> for CommandError {
    fn from(value: Arc<DbErr>) -> Self {
        Self::Unexpected(value.into())
    }
}

/// Per-guild quiz configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildQuizSettings {
    pub channel: Option<ChannelId>,
    pub dashboard_message: Option<MessageId>,
    pub enabled: bool,
    /// `None` means the default blacklist applies.
    pub blacklist: Option<HashSet<String>>,
    pub leader_role: Option<RoleId>,
    pub leader_user: Option<UserId>,
}

impl Default for GuildQuizSettings {
    fn default() -> Self {
        Self {
            channel: None,
            dashboard_message: None,
            enabled: true,
            blacklist: None,
            leader_role: None,
            leader_user: None,
        }
    }
}

impl From<flag_quiz_guild::Model> for GuildQuizSettings {
    fn from(model: flag_quiz_guild::Model) -> Self {
        Self {
            channel: model.channel.map(|id| ChannelId::new(id as u64)),
            dashboard_message: model.dashboard_message.map(|id| MessageId::new(id as u64)),
            enabled: model.enabled,
            blacklist: model.blacklist.as_deref().map(parse_blacklist),
            leader_role: model.leader_role.map(|id| RoleId::new(id as u64)),
            leader_user: model.leader_user.map(|id| UserId::new(id as u64)),
        }
    }
}

impl From<flag_player::Model> for PlayerStats {
    fn from(model: flag_player::Model) -> Self {
        Self {
            total_points: model.total_points,
            weekly_points: model.weekly_points,
            weekly_key: model.weekly_key,
            monthly_points: model.monthly_points,
            monthly_key: model.monthly_key,
            correct: model.correct,
            wrong: model.wrong,
            current_streak: model.current_streak,
            best_streak: model.best_streak,
            last_daily: model.last_daily,
        }
    }
}

impl From<flag_stat::Model> for FlagStats {
    fn from(model: flag_stat::Model) -> Self {
        Self {
            asked: model.asked,
            correct: model.correct,
            wrong: model.wrong,
        }
    }
}

const fn db_id(id: u64) -> i64 {
    id as i64
}

pub struct Database {
    db: DatabaseConnection,
    guild_cache: Cache<GuildId, GuildQuizSettings, RandomState>,
}

impl Database {
    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str) -> Result<Self, DbErr> {
        let db = sea_orm::Database::connect(url).await?;
        Migrator::up(&db, None).await?;
        Ok(Self {
            db,
            guild_cache: Cache::builder()
                .max_capacity(1000)
                .build_with_hasher(RandomState::new()),
        })
    }

    pub async fn get_flag_player_stats(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<PlayerStats>, DbErr> {
        Ok(FlagPlayer::find_by_id((db_id(guild.get()), db_id(user.get())))
            .one(&self.db)
            .await?
            .map(PlayerStats::from))
    }
    pub async fn upsert_flag_player_stats(
        &self,
        guild: GuildId,
        user: UserId,
        stats: &PlayerStats,
    ) -> Result<(), DbErr> {
        FlagPlayer::insert(flag_player::ActiveModel {
            guild: Set(db_id(guild.get())),
            user: Set(db_id(user.get())),
            total_points: Set(stats.total_points),
            weekly_points: Set(stats.weekly_points),
            weekly_key: Set(stats.weekly_key.clone()),
            monthly_points: Set(stats.monthly_points),
            monthly_key: Set(stats.monthly_key.clone()),
            correct: Set(stats.correct),
            wrong: Set(stats.wrong),
            current_streak: Set(stats.current_streak),
            best_streak: Set(stats.best_streak),
            last_daily: Set(stats.last_daily),
        })
        .on_conflict(
            OnConflict::columns([flag_player::Column::Guild, flag_player::Column::User])
                .update_columns([
                    flag_player::Column::TotalPoints,
                    flag_player::Column::WeeklyPoints,
                    flag_player::Column::WeeklyKey,
                    flag_player::Column::MonthlyPoints,
                    flag_player::Column::MonthlyKey,
                    flag_player::Column::Correct,
                    flag_player::Column::Wrong,
                    flag_player::Column::CurrentStreak,
                    flag_player::Column::BestStreak,
                    flag_player::Column::LastDaily,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;
        Ok(())
    }

    pub async fn get_flag_stats(
        &self,
        guild: GuildId,
        code: &str,
    ) -> Result<Option<FlagStats>, DbErr> {
        Ok(FlagStat::find_by_id((db_id(guild.get()), code.to_owned()))
            .one(&self.db)
            .await?
            .map(FlagStats::from))
    }
    /// Adds `delta` to the counters in one statement and returns the row
    /// as read afterwards.
    pub async fn add_flag_stats(
        &self,
        guild: GuildId,
        code: &str,
        delta: FlagStats,
    ) -> Result<FlagStats, DbErr> {
        FlagStat::insert(flag_stat::ActiveModel {
            guild: Set(db_id(guild.get())),
            code: Set(code.to_owned()),
            asked: Set(delta.asked),
            correct: Set(delta.correct),
            wrong: Set(delta.wrong),
        })
        .on_conflict(
            OnConflict::columns([flag_stat::Column::Guild, flag_stat::Column::Code])
                .value(
                    flag_stat::Column::Asked,
                    Expr::col(flag_stat::Column::Asked).add(delta.asked),
                )
                .value(
                    flag_stat::Column::Correct,
                    Expr::col(flag_stat::Column::Correct).add(delta.correct),
                )
                .value(
                    flag_stat::Column::Wrong,
                    Expr::col(flag_stat::Column::Wrong).add(delta.wrong),
                )
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;
        Ok(self.get_flag_stats(guild, code).await?.unwrap_or(delta))
    }
    pub async fn list_flag_stats_top_asked(
        &self,
        guild: GuildId,
        limit: u64,
    ) -> Result<Vec<(String, FlagStats)>, DbErr> {
        Ok(FlagStat::find()
            .filter(flag_stat::Column::Guild.eq(db_id(guild.get())))
            .filter(flag_stat::Column::Asked.gt(0))
            .order_by_desc(flag_stat::Column::Asked)
            .order_by_asc(flag_stat::Column::Code)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| (model.code.clone(), FlagStats::from(model)))
            .collect())
    }

    pub async fn get_flag_quiz_guild(
        &self,
        guild: GuildId,
    ) -> Result<GuildQuizSettings, Arc<DbErr>> {
        self.guild_cache
            .try_get_with(guild, async {
                Ok(FlagQuizGuild::find_by_id(db_id(guild.get()))
                    .one(&self.db)
                    .await?
                    .map(GuildQuizSettings::from)
                    .unwrap_or_default())
            })
            .await
    }
    async fn update_flag_quiz_guild(
        &self,
        guild: GuildId,
        model: flag_quiz_guild::ActiveModel,
        columns: impl IntoIterator<Item = flag_quiz_guild::Column>,
    ) -> Result<(), DbErr> {
        FlagQuizGuild::insert(flag_quiz_guild::ActiveModel {
            guild: Set(db_id(guild.get())),
            ..model
        })
        .on_conflict(
            OnConflict::column(flag_quiz_guild::Column::Guild)
                .update_columns(columns)
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;
        self.guild_cache.invalidate(&guild).await;
        Ok(())
    }
    pub async fn set_flag_quiz_channel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<(), DbErr> {
        self.update_flag_quiz_guild(
            guild,
            flag_quiz_guild::ActiveModel {
                channel: Set(Some(db_id(channel.get()))),
                // a dashboard in the previous channel is abandoned
                dashboard_message: Set(None),
                ..Default::default()
            },
            [
                flag_quiz_guild::Column::Channel,
                flag_quiz_guild::Column::DashboardMessage,
            ],
        )
        .await
    }
    pub async fn set_flag_quiz_dashboard_message(
        &self,
        guild: GuildId,
        message: MessageId,
    ) -> Result<(), DbErr> {
        self.update_flag_quiz_guild(
            guild,
            flag_quiz_guild::ActiveModel {
                dashboard_message: Set(Some(db_id(message.get()))),
                ..Default::default()
            },
            [flag_quiz_guild::Column::DashboardMessage],
        )
        .await
    }
    pub async fn set_flag_quiz_enabled(&self, guild: GuildId, enabled: bool) -> Result<(), DbErr> {
        self.update_flag_quiz_guild(
            guild,
            flag_quiz_guild::ActiveModel {
                enabled: Set(enabled),
                ..Default::default()
            },
            [flag_quiz_guild::Column::Enabled],
        )
        .await
    }
    /// `None` restores the default blacklist.
    pub async fn set_flag_quiz_blacklist(
        &self,
        guild: GuildId,
        blacklist: Option<&HashSet<String>>,
    ) -> Result<(), DbErr> {
        let blacklist = blacklist.map(|codes| {
            let mut codes = codes.iter().map(String::as_str).collect::<Vec<_>>();
            codes.sort_unstable();
            codes.join(",")
        });
        self.update_flag_quiz_guild(
            guild,
            flag_quiz_guild::ActiveModel {
                blacklist: Set(blacklist),
                ..Default::default()
            },
            [flag_quiz_guild::Column::Blacklist],
        )
        .await
    }
    /// Changing the role forgets who held the previous one.
    pub async fn set_flag_quiz_leader_role(
        &self,
        guild: GuildId,
        role: Option<RoleId>,
    ) -> Result<(), DbErr> {
        self.update_flag_quiz_guild(
            guild,
            flag_quiz_guild::ActiveModel {
                leader_role: Set(role.map(|role| db_id(role.get()))),
                leader_user: Set(None),
                ..Default::default()
            },
            [
                flag_quiz_guild::Column::LeaderRole,
                flag_quiz_guild::Column::LeaderUser,
            ],
        )
        .await
    }
    pub async fn set_flag_quiz_leader_user(
        &self,
        guild: GuildId,
        user: Option<UserId>,
    ) -> Result<(), DbErr> {
        self.update_flag_quiz_guild(
            guild,
            flag_quiz_guild::ActiveModel {
                leader_user: Set(user.map(|user| db_id(user.get()))),
                ..Default::default()
            },
            [flag_quiz_guild::Column::LeaderUser],
        )
        .await
    }

    async fn top_points(
        &self,
        guild: GuildId,
        points: flag_player::Column,
        period: Option<(flag_player::Column, &str)>,
        limit: u64,
    ) -> Result<Vec<(UserId, i64)>, DbErr> {
        let mut query = FlagPlayer::find()
            .select_only()
            .column(flag_player::Column::User)
            .column(points)
            .filter(flag_player::Column::Guild.eq(db_id(guild.get())))
            .filter(points.gt(0));
        if let Some((key_column, key)) = period {
            query = query.filter(key_column.eq(key));
        }
        Ok(query
            .order_by_desc(points)
            .order_by_asc(flag_player::Column::User)
            .limit(limit)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(user, points)| (UserId::new(user as u64), points))
            .collect())
    }
    pub async fn list_flag_players_top_points(
        &self,
        guild: GuildId,
        limit: u64,
    ) -> Result<Vec<(UserId, i64)>, DbErr> {
        self.top_points(guild, flag_player::Column::TotalPoints, None, limit)
            .await
    }
    /// Only rows already keyed to `week` count, stale rows hold last week's points.
    pub async fn list_flag_players_top_points_weekly(
        &self,
        guild: GuildId,
        week: &str,
        limit: u64,
    ) -> Result<Vec<(UserId, i64)>, DbErr> {
        self.top_points(
            guild,
            flag_player::Column::WeeklyPoints,
            Some((flag_player::Column::WeeklyKey, week)),
            limit,
        )
        .await
    }
    pub async fn list_flag_players_top_points_monthly(
        &self,
        guild: GuildId,
        month: &str,
        limit: u64,
    ) -> Result<Vec<(UserId, i64)>, DbErr> {
        self.top_points(
            guild,
            flag_player::Column::MonthlyPoints,
            Some((flag_player::Column::MonthlyKey, month)),
            limit,
        )
        .await
    }
    /// (user, current streak, best streak), best streaks first.
    pub async fn list_flag_players_top_streak(
        &self,
        guild: GuildId,
        limit: u64,
    ) -> Result<Vec<(UserId, i64, i64)>, DbErr> {
        Ok(FlagPlayer::find()
            .select_only()
            .column(flag_player::Column::User)
            .column(flag_player::Column::CurrentStreak)
            .column(flag_player::Column::BestStreak)
            .filter(flag_player::Column::Guild.eq(db_id(guild.get())))
            .filter(flag_player::Column::BestStreak.gt(0))
            .order_by_desc(flag_player::Column::BestStreak)
            .order_by_desc(flag_player::Column::CurrentStreak)
            .order_by_asc(flag_player::Column::User)
            .limit(limit)
            .into_tuple::<(i64, i64, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(user, current, best)| (UserId::new(user as u64), current, best))
            .collect())
    }
    pub async fn count_flag_players(&self, guild: GuildId) -> Result<u64, DbErr> {
        FlagPlayer::find()
            .filter(flag_player::Column::Guild.eq(db_id(guild.get())))
            .count(&self.db)
            .await
    }
    pub async fn sum_flag_rounds(&self, guild: GuildId) -> Result<i64, DbErr> {
        let (correct, wrong) = FlagPlayer::find()
            .select_only()
            .column_as(flag_player::Column::Correct.sum(), "correct")
            .column_as(flag_player::Column::Wrong.sum(), "wrong")
            .filter(flag_player::Column::Guild.eq(db_id(guild.get())))
            .into_tuple::<(Option<i64>, Option<i64>)>()
            .one(&self.db)
            .await?
            .unwrap_or_default();
        Ok(correct.unwrap_or(0) + wrong.unwrap_or(0))
    }
    pub async fn best_flag_streak(&self, guild: GuildId) -> Result<i64, DbErr> {
        Ok(FlagPlayer::find()
            .select_only()
            .column_as(flag_player::Column::BestStreak.max(), "best")
            .filter(flag_player::Column::Guild.eq(db_id(guild.get())))
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await?
            .flatten()
            .unwrap_or(0))
    }

    /// Returns whether the achievement was newly inserted.
    pub async fn add_achievement(
        &self,
        guild: GuildId,
        user: UserId,
        code: &str,
    ) -> Result<bool, DbErr> {
        let inserted = Achievement::insert(achievement::ActiveModel {
            guild: Set(db_id(guild.get())),
            user: Set(db_id(user.get())),
            code: Set(code.to_owned()),
        })
        .on_conflict(
            OnConflict::columns([
                achievement::Column::Guild,
                achievement::Column::User,
                achievement::Column::Code,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;
        Ok(inserted > 0)
    }
    pub async fn list_achievements(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Vec<String>, DbErr> {
        Achievement::find()
            .select_only()
            .column(achievement::Column::Code)
            .filter(achievement::Column::Guild.eq(db_id(guild.get())))
            .filter(achievement::Column::User.eq(db_id(user.get())))
            .order_by_asc(achievement::Column::Code)
            .into_tuple::<String>()
            .all(&self.db)
            .await
    }
}
