use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20261019_000001_init_database"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FlagQuizGuild::Table)
                    .col(
                        ColumnDef::new(FlagQuizGuild::Guild)
                            .primary_key()
                            .not_null()
                            .big_unsigned(),
                    )
                    .col(ColumnDef::new(FlagQuizGuild::Channel).big_unsigned())
                    .col(ColumnDef::new(FlagQuizGuild::DashboardMessage).big_unsigned())
                    .col(
                        ColumnDef::new(FlagQuizGuild::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(FlagQuizGuild::Blacklist).string())
                    .col(ColumnDef::new(FlagQuizGuild::LeaderRole).big_unsigned())
                    .col(ColumnDef::new(FlagQuizGuild::LeaderUser).big_unsigned())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(FlagPlayer::Table)
                    .col(ColumnDef::new(FlagPlayer::Guild).not_null().big_unsigned())
                    .col(ColumnDef::new(FlagPlayer::User).not_null().big_unsigned())
                    .col(
                        ColumnDef::new(FlagPlayer::TotalPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::WeeklyPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::WeeklyKey)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::MonthlyPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::MonthlyKey)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::Correct)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::Wrong)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::CurrentStreak)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagPlayer::BestStreak)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FlagPlayer::LastDaily).date())
                    .primary_key(Index::create().col(FlagPlayer::Guild).col(FlagPlayer::User))
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(FlagStat::Table)
                    .col(ColumnDef::new(FlagStat::Guild).not_null().big_unsigned())
                    .col(ColumnDef::new(FlagStat::Code).not_null().string_len(2))
                    .col(
                        ColumnDef::new(FlagStat::Asked)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagStat::Correct)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FlagStat::Wrong)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(Index::create().col(FlagStat::Guild).col(FlagStat::Code))
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Achievement::Table)
                    .col(ColumnDef::new(Achievement::Guild).not_null().big_unsigned())
                    .col(ColumnDef::new(Achievement::User).not_null().big_unsigned())
                    .col(ColumnDef::new(Achievement::Code).not_null().string())
                    .primary_key(
                        Index::create()
                            .col(Achievement::Guild)
                            .col(Achievement::User)
                            .col(Achievement::Code),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(FlagPlayer::Table)
                    .col(FlagPlayer::Guild)
                    .col(FlagPlayer::WeeklyKey)
                    .name("idx-flag-player-guild-week")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(FlagPlayer::Table)
                    .col(FlagPlayer::Guild)
                    .col(FlagPlayer::MonthlyKey)
                    .name("idx-flag-player-guild-month")
                    .to_owned(),
            )
            .await
    }
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Achievement::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FlagStat::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FlagPlayer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FlagQuizGuild::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FlagQuizGuild {
    Table,
    Guild,
    Channel,
    DashboardMessage,
    Enabled,
    Blacklist,
    LeaderRole,
    LeaderUser,
}
#[derive(Iden)]
pub enum FlagPlayer {
    Table,
    Guild,
    User,
    TotalPoints,
    WeeklyPoints,
    WeeklyKey,
    MonthlyPoints,
    MonthlyKey,
    Correct,
    Wrong,
    CurrentStreak,
    BestStreak,
    LastDaily,
}
#[derive(Iden)]
pub enum FlagStat {
    Table,
    Guild,
    Code,
    Asked,
    Correct,
    Wrong,
}
#[derive(Iden)]
pub enum Achievement {
    Table,
    Guild,
    User,
    Code,
}
