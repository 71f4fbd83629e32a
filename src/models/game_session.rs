use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub game_type: String, // 'pattern', 'sequence', 'logic'
    pub difficulty: String, // 'easy', 'medium', 'hard'
    pub grade: Option<i32>,
    pub current_round: i32,
    pub total_rounds: i32,
    pub answered_in_round: i32,
    pub score: i32,
    pub streak: i32,
    pub phase: String,
    pub completed_at: Option<String>, // NULL = in progress
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDto {
    pub user_id: i32,
    pub game_type: String,
    pub difficulty: Option<String>,
    pub grade: Option<i32>,
    pub total_rounds: Option<i32>,
}
