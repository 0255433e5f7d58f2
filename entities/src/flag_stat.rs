use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "flag_stat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub asked: i64,
    pub correct: i64,
    pub wrong: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
