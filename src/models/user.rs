use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub role: String, // 'student', 'teacher'
    pub grade: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quiz_attempt::Entity")]
    QuizAttempt,
    #[sea_orm(has_many = "super::earned_achievement::Entity")]
    EarnedAchievement,
    #[sea_orm(has_many = "super::game_session::Entity")]
    GameSession,
}

impl Related<super::quiz_attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizAttempt.def()
    }
}

impl Related<super::earned_achievement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EarnedAchievement.def()
    }
}

impl Related<super::game_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub username: String,
    pub display_name: String,
    pub role: Option<String>,
    pub grade: Option<i32>,
}
