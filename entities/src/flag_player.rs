use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "flag_player")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user: i64,
    pub total_points: i64,
    pub weekly_points: i64,
    pub weekly_key: String,
    pub monthly_points: i64,
    pub monthly_key: String,
    pub correct: i64,
    pub wrong: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub last_daily: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
