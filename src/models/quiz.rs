use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub subject: String, // 'math', 'science', 'english', ...
    pub grade: i32,
    pub question_count: i32,
    pub max_score: i32,
    pub created_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(has_many = "super::quiz_attempt::Entity")]
    QuizAttempt,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::quiz_attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizAttempt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizDto {
    pub title: String,
    pub subject: String,
    pub grade: i32,
    pub question_count: i32,
    pub max_score: Option<i32>,
    pub created_by: Option<i32>,
}
