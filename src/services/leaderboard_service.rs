//! Leaderboard ranking over total points.

use sea_orm::*;

use crate::models::user::{self, Entity as User};
use crate::services::stats_service;
use crate::services::ServiceError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i32,
    pub display_name: String,
    pub grade: Option<i32>,
    pub total_points: i64,
    pub activities_completed: u64,
}

/// Students ranked by total points, optionally restricted to one grade.
/// Ties share point totals but not ranks; ordering inside a tie is by
/// display name so the board is stable between refreshes.
pub async fn leaderboard(
    db: &DatabaseConnection,
    grade: Option<i32>,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let mut condition = Condition::all().add(user::Column::Role.eq("student"));
    if let Some(grade) = grade {
        condition = condition.add(user::Column::Grade.eq(grade));
    }

    let students = User::find().filter(condition).all(db).await?;
    let mut activity = stats_service::activity_by_user(db).await?;

    let mut entries: Vec<LeaderboardEntry> = students
        .into_iter()
        .map(|student| {
            let records = activity.remove(&student.id).unwrap_or_default();
            let snapshot = stats_service::aggregate(&records);
            LeaderboardEntry {
                rank: 0,
                user_id: student.id,
                display_name: student.display_name,
                grade: student.grade,
                total_points: snapshot.total_points,
                activities_completed: snapshot.total_completed,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    entries.truncate(limit);

    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }

    Ok(entries)
}
