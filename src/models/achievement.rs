use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sentinel badge color marking a definition as disabled.
pub const BADGE_DISABLED: &str = "none";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Stable rule binding; the display name is cosmetic. NULL or an
    /// unknown key routes to the generic points threshold.
    pub rule_key: Option<String>,
    pub points_required: i32,
    pub badge_color: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Model {
    pub fn is_enabled(&self) -> bool {
        self.badge_color != BADGE_DISABLED
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::earned_achievement::Entity")]
    EarnedAchievement,
}

impl Related<super::earned_achievement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EarnedAchievement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
