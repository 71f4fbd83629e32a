//! Achievement evaluation
//!
//! Given a stats snapshot and the set of already-earned achievement ids,
//! decides which definitions newly qualify and records them. Qualification
//! and displayed progress share one rule dispatch so they cannot disagree.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::*;

use crate::models::achievement::{self, Entity as Achievement, BADGE_DISABLED};
use crate::models::earned_achievement::{self, Entity as EarnedAchievement};
use crate::services::stats_service::{self, UserStatsSnapshot};
use crate::services::ServiceError;

/// Stable rule binding, stored as `rule_key` on the definition row.
/// Renaming a badge in the UI never detaches it from its rule; rows with
/// no key (or a key nobody recognizes) fall back to the points threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKey {
    FirstSteps,
    QuizExplorer,
    MathWhiz,
    ScienceStar,
    WordWizard,
    PatternPro,
    LogicLegend,
    Perfectionist,
    PointCollector,
    /// Timed-play tracking is not collected; never qualifies.
    SpeedDemon,
    /// Day-over-day streaks are not collected; never qualifies.
    StreakMaster,
    /// Grade-level mastery validation is not collected; never qualifies.
    GradeAce,
    /// Study groups do not exist; never qualifies.
    StudyBuddy,
    /// Generic fallback: total points against the row's own threshold.
    PointsThreshold,
}

impl RuleKey {
    pub fn parse(raw: Option<&str>) -> RuleKey {
        match raw.unwrap_or_default() {
            "first_steps" => RuleKey::FirstSteps,
            "quiz_explorer" => RuleKey::QuizExplorer,
            "math_whiz" => RuleKey::MathWhiz,
            "science_star" => RuleKey::ScienceStar,
            "word_wizard" => RuleKey::WordWizard,
            "pattern_pro" => RuleKey::PatternPro,
            "logic_legend" => RuleKey::LogicLegend,
            "perfectionist" => RuleKey::Perfectionist,
            "point_collector" => RuleKey::PointCollector,
            "speed_demon" => RuleKey::SpeedDemon,
            "streak_master" => RuleKey::StreakMaster,
            "grade_ace" => RuleKey::GradeAce,
            "study_buddy" => RuleKey::StudyBuddy,
            _ => RuleKey::PointsThreshold,
        }
    }

    /// (current, required) for this rule, or None when the rule is
    /// hard-disabled because its inputs are not collected anywhere.
    fn metrics(self, stats: &UserStatsSnapshot, def: &achievement::Model) -> Option<(u64, u64)> {
        let pair = match self {
            RuleKey::FirstSteps => (stats.total_completed, 1),
            RuleKey::QuizExplorer => (stats.total_completed, 10),
            RuleKey::MathWhiz => (stats.category_count("math"), 5),
            RuleKey::ScienceStar => (stats.category_count("science"), 5),
            RuleKey::WordWizard => (stats.category_count("english"), 5),
            RuleKey::PatternPro => (stats.category_count("pattern"), 5),
            RuleKey::LogicLegend => (stats.category_count("logic"), 5),
            RuleKey::Perfectionist => (stats.perfect_scores, 3),
            RuleKey::PointCollector => (stats.total_points.max(0) as u64, 500),
            RuleKey::PointsThreshold => (
                stats.total_points.max(0) as u64,
                def.points_required.max(0) as u64,
            ),
            RuleKey::SpeedDemon
            | RuleKey::StreakMaster
            | RuleKey::GradeAce
            | RuleKey::StudyBuddy => return None,
        };
        Some(pair)
    }
}

fn rule_for(def: &achievement::Model) -> RuleKey {
    RuleKey::parse(def.rule_key.as_deref())
}

pub fn qualifies(stats: &UserStatsSnapshot, def: &achievement::Model) -> bool {
    match rule_for(def).metrics(stats, def) {
        Some((current, required)) => current >= required,
        None => false,
    }
}

/// Completion fraction in [0, 1]. Uses the same metrics as `qualifies`,
/// so progress reaches 1.0 exactly when the rule is satisfied.
pub fn progress(stats: &UserStatsSnapshot, def: &achievement::Model) -> f32 {
    match rule_for(def).metrics(stats, def) {
        Some((_, 0)) => 1.0,
        Some((current, required)) => (current as f32 / required as f32).min(1.0),
        None => 0.0,
    }
}

/// Definitions not yet earned whose rule is now satisfied, in input order.
/// Disabled definitions (sentinel badge color) never qualify.
pub fn newly_qualified<'a>(
    stats: &UserStatsSnapshot,
    definitions: &'a [achievement::Model],
    earned: &HashSet<i32>,
) -> Vec<&'a achievement::Model> {
    definitions
        .iter()
        .filter(|d| d.is_enabled())
        .filter(|d| !earned.contains(&d.id))
        .filter(|d| qualifies(stats, d))
        .collect()
}

pub async fn load_enabled_definitions(
    db: &DatabaseConnection,
) -> Result<Vec<achievement::Model>, ServiceError> {
    let definitions = Achievement::find()
        .filter(achievement::Column::BadgeColor.ne(BADGE_DISABLED))
        .order_by_asc(achievement::Column::Id)
        .all(db)
        .await?;
    Ok(definitions)
}

pub async fn earned_ids(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<HashSet<i32>, ServiceError> {
    let rows = EarnedAchievement::find()
        .filter(earned_achievement::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.achievement_id).collect())
}

/// Recompute the user's stats and award every newly qualifying
/// achievement. A failed insert is logged and skipped so one bad row
/// never blocks the rest; calling this again with unchanged stats awards
/// nothing (the earned-set check, not the unique index, is the guard).
pub async fn evaluate_and_award(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<achievement::Model>, ServiceError> {
    let stats = stats_service::snapshot_for_user(db, user_id).await?;
    let definitions = load_enabled_definitions(db).await?;
    let earned = earned_ids(db, user_id).await?;

    let mut awarded = Vec::new();

    for def in newly_qualified(&stats, &definitions, &earned) {
        let row = earned_achievement::ActiveModel {
            user_id: Set(user_id),
            achievement_id: Set(def.id),
            earned_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match row.insert(db).await {
            Ok(_) => awarded.push(def.clone()),
            Err(e) => {
                tracing::warn!(
                    "failed to record achievement {} for user {}: {}",
                    def.id,
                    user_id,
                    e
                );
            }
        }
    }

    Ok(awarded)
}

/// A definition joined with the user's earned flag and progress fraction.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AchievementStatus {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub badge_color: String,
    pub points_required: i32,
    pub earned: bool,
    pub earned_at: Option<String>,
    pub progress: f32,
}

/// Every enabled definition with the user's standing against it,
/// earned badges first, the rest by descending progress.
pub async fn achievements_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<AchievementStatus>, ServiceError> {
    let stats = stats_service::snapshot_for_user(db, user_id).await?;
    let definitions = load_enabled_definitions(db).await?;

    let earned_rows = EarnedAchievement::find()
        .filter(earned_achievement::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    let earned_at: HashMap<i32, String> = earned_rows
        .into_iter()
        .map(|r| (r.achievement_id, r.earned_at))
        .collect();

    let mut statuses: Vec<AchievementStatus> = definitions
        .iter()
        .map(|def| {
            let earned = earned_at.contains_key(&def.id);
            AchievementStatus {
                id: def.id,
                name: def.name.clone(),
                description: def.description.clone(),
                badge_color: def.badge_color.clone(),
                points_required: def.points_required,
                earned,
                earned_at: earned_at.get(&def.id).cloned(),
                progress: if earned { 1.0 } else { progress(&stats, def) },
            }
        })
        .collect();

    statuses.sort_by(|a, b| {
        b.earned
            .cmp(&a.earned)
            .then(b.progress.total_cmp(&a.progress))
    });

    Ok(statuses)
}
