use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "flag_quiz_guild")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild: i64,
    pub channel: Option<i64>,
    pub dashboard_message: Option<i64>,
    pub enabled: bool,
    pub blacklist: Option<String>,
    pub leader_role: Option<i64>,
    pub leader_user: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
