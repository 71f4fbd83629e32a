//! Progress aggregation - turns raw attempt and session rows into the
//! aggregate statistics the dashboard, evaluator and reports consume.

use std::collections::HashMap;

use sea_orm::*;

use crate::models::game_session::{self, Entity as GameSession};
use crate::models::quiz::{self, Entity as Quiz};
use crate::models::quiz_attempt::{self, Entity as QuizAttempt};
use crate::services::ServiceError;

/// Point-in-time aggregate over a user's completed activity.
/// Recomputed on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserStatsSnapshot {
    pub total_points: i64,
    pub total_completed: u64,
    pub per_category: HashMap<String, u64>,
    pub perfect_scores: u64,
}

impl UserStatsSnapshot {
    pub fn category_count(&self, category: &str) -> u64 {
        self.per_category.get(category).copied().unwrap_or(0)
    }
}

/// One activity record fed to the aggregator. Quiz attempts carry the quiz
/// id as `item_key` so retakes collapse to the most recent completion;
/// game sessions have no key and every completed one counts.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub item_key: Option<String>,
    pub category: String,
    pub score: i32,
    pub max_score: i32,
    pub completed_at: Option<String>,
}

/// Completed records only. For records sharing an item key, the latest
/// completion wins; on equal timestamps the later record in input order wins.
fn completed_distinct(records: &[ActivityRecord]) -> Vec<&ActivityRecord> {
    let mut latest: HashMap<&str, &ActivityRecord> = HashMap::new();
    let mut keyed_order: Vec<&str> = Vec::new();
    let mut keyless: Vec<&ActivityRecord> = Vec::new();

    for rec in records {
        let Some(completed_at) = rec.completed_at.as_deref() else {
            continue;
        };
        match rec.item_key.as_deref() {
            None => keyless.push(rec),
            Some(key) => match latest.get(key) {
                Some(existing)
                    if existing.completed_at.as_deref().unwrap_or("") > completed_at => {}
                Some(_) => {
                    latest.insert(key, rec);
                }
                None => {
                    latest.insert(key, rec);
                    keyed_order.push(key);
                }
            },
        }
    }

    let mut result: Vec<&ActivityRecord> = keyed_order
        .into_iter()
        .filter_map(|key| latest.get(key).copied())
        .collect();
    result.extend(keyless);
    result
}

pub fn aggregate(records: &[ActivityRecord]) -> UserStatsSnapshot {
    let mut snapshot = UserStatsSnapshot::default();

    for rec in completed_distinct(records) {
        snapshot.total_points += rec.score as i64;
        snapshot.total_completed += 1;
        *snapshot.per_category.entry(rec.category.clone()).or_insert(0) += 1;
        if rec.max_score > 0 && rec.score >= rec.max_score {
            snapshot.perfect_scores += 1;
        }
    }

    snapshot
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub attempts: u64,
    pub average: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Dashboard {
    pub total_points: i64,
    pub total_completed: u64,
    pub average_score: i64,
    pub perfect_scores: u64,
    pub subjects: Vec<SubjectAverage>,
    /// "None" when the user has no completed activity.
    pub best_subject: String,
}

fn rounded_average(total: i64, count: u64) -> i64 {
    if count == 0 {
        return 0;
    }
    (total as f64 / count as f64).round() as i64
}

pub fn dashboard_from(records: &[ActivityRecord]) -> Dashboard {
    let completed = completed_distinct(records);

    let mut total_points: i64 = 0;
    let mut perfect_scores: u64 = 0;
    let mut per_subject: HashMap<&str, (u64, i64)> = HashMap::new();

    for rec in &completed {
        total_points += rec.score as i64;
        if rec.max_score > 0 && rec.score >= rec.max_score {
            perfect_scores += 1;
        }
        let entry = per_subject.entry(rec.category.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += rec.score as i64;
    }

    let mut subjects: Vec<SubjectAverage> = per_subject
        .into_iter()
        .map(|(subject, (attempts, points))| SubjectAverage {
            subject: subject.to_string(),
            attempts,
            average: rounded_average(points, attempts),
        })
        .collect();
    subjects.sort_by(|a, b| a.subject.cmp(&b.subject));

    let best_subject = subjects
        .iter()
        .max_by(|a, b| a.average.cmp(&b.average))
        .map(|s| s.subject.clone())
        .unwrap_or_else(|| "None".to_string());

    Dashboard {
        total_points,
        total_completed: completed.len() as u64,
        average_score: rounded_average(total_points, completed.len() as u64),
        perfect_scores,
        subjects,
        best_subject,
    }
}

/// Fetch a user's quiz attempts and game sessions as activity records,
/// ordered by completion time ascending.
pub async fn activity_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ActivityRecord>, ServiceError> {
    let attempts = QuizAttempt::find()
        .filter(quiz_attempt::Column::UserId.eq(user_id))
        .order_by_asc(quiz_attempt::Column::CompletedAt)
        .all(db)
        .await?;

    // Resolve quiz subjects in one query
    let quiz_ids: Vec<i32> = attempts.iter().map(|a| a.quiz_id).collect();
    let mut subject_map: HashMap<i32, String> = HashMap::new();
    if !quiz_ids.is_empty() {
        let quizzes = Quiz::find()
            .filter(quiz::Column::Id.is_in(quiz_ids))
            .all(db)
            .await?;
        for q in quizzes {
            subject_map.insert(q.id, q.subject);
        }
    }

    let mut records: Vec<ActivityRecord> = attempts
        .into_iter()
        .map(|a| ActivityRecord {
            item_key: Some(format!("quiz:{}", a.quiz_id)),
            category: subject_map
                .get(&a.quiz_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            score: a.score,
            max_score: a.max_score,
            completed_at: a.completed_at,
        })
        .collect();

    let sessions = GameSession::find()
        .filter(game_session::Column::UserId.eq(user_id))
        .order_by_asc(game_session::Column::CompletedAt)
        .all(db)
        .await?;

    records.extend(sessions.into_iter().map(|s| ActivityRecord {
        item_key: None,
        category: s.game_type,
        score: s.score,
        max_score: 0, // sessions have no fixed maximum
        completed_at: s.completed_at,
    }));

    Ok(records)
}

/// Activity records for every user, grouped by user id. Shared by the
/// leaderboard and class reports so both see the same dedupe rules.
pub async fn activity_by_user(
    db: &DatabaseConnection,
) -> Result<HashMap<i32, Vec<ActivityRecord>>, ServiceError> {
    let attempts = QuizAttempt::find()
        .order_by_asc(quiz_attempt::Column::CompletedAt)
        .all(db)
        .await?;

    let quiz_ids: Vec<i32> = attempts.iter().map(|a| a.quiz_id).collect();
    let mut subject_map: HashMap<i32, String> = HashMap::new();
    if !quiz_ids.is_empty() {
        let quizzes = Quiz::find()
            .filter(quiz::Column::Id.is_in(quiz_ids))
            .all(db)
            .await?;
        for q in quizzes {
            subject_map.insert(q.id, q.subject);
        }
    }

    let mut grouped: HashMap<i32, Vec<ActivityRecord>> = HashMap::new();

    for a in attempts {
        grouped.entry(a.user_id).or_default().push(ActivityRecord {
            item_key: Some(format!("quiz:{}", a.quiz_id)),
            category: subject_map
                .get(&a.quiz_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            score: a.score,
            max_score: a.max_score,
            completed_at: a.completed_at,
        });
    }

    let sessions = GameSession::find()
        .order_by_asc(game_session::Column::CompletedAt)
        .all(db)
        .await?;

    for s in sessions {
        grouped.entry(s.user_id).or_default().push(ActivityRecord {
            item_key: None,
            category: s.game_type,
            score: s.score,
            max_score: 0,
            completed_at: s.completed_at,
        });
    }

    Ok(grouped)
}

pub async fn snapshot_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<UserStatsSnapshot, ServiceError> {
    let records = activity_for_user(db, user_id).await?;
    Ok(aggregate(&records))
}

pub async fn dashboard_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Dashboard, ServiceError> {
    let records = activity_for_user(db, user_id).await?;
    Ok(dashboard_from(&records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(key: &str, subject: &str, score: i32, completed_at: Option<&str>) -> ActivityRecord {
        ActivityRecord {
            item_key: Some(key.to_string()),
            category: subject.to_string(),
            score,
            max_score: 100,
            completed_at: completed_at.map(|s| s.to_string()),
        }
    }

    #[test]
    fn empty_input_yields_neutral_dashboard() {
        let dashboard = dashboard_from(&[]);

        assert_eq!(dashboard.total_completed, 0);
        assert_eq!(dashboard.average_score, 0);
        assert_eq!(dashboard.best_subject, "None");
    }

    #[test]
    fn retake_counts_only_latest_completion() {
        let records = vec![
            quiz("quiz:1", "math", 70, Some("2026-03-01T10:00:00+00:00")),
            quiz("quiz:1", "math", 95, Some("2026-03-02T10:00:00+00:00")),
        ];
        let snapshot = aggregate(&records);

        assert_eq!(snapshot.total_completed, 1);
        assert_eq!(snapshot.total_points, 95);
    }

    #[test]
    fn retake_dedupe_keeps_later_row_even_when_listed_first() {
        let records = vec![
            quiz("quiz:1", "math", 95, Some("2026-03-02T10:00:00+00:00")),
            quiz("quiz:1", "math", 70, Some("2026-03-01T10:00:00+00:00")),
        ];
        let snapshot = aggregate(&records);

        assert_eq!(snapshot.total_points, 95);
    }

    #[test]
    fn equal_timestamps_let_the_later_record_win() {
        let records = vec![
            quiz("quiz:1", "math", 70, Some("2026-03-01T10:00:00+00:00")),
            quiz("quiz:1", "math", 88, Some("2026-03-01T10:00:00+00:00")),
        ];
        let snapshot = aggregate(&records);

        assert_eq!(snapshot.total_points, 88);
    }

    #[test]
    fn incomplete_attempts_are_ignored() {
        let records = vec![
            quiz("quiz:1", "math", 100, None),
            quiz("quiz:2", "math", 50, Some("2026-03-01T10:00:00+00:00")),
        ];
        let snapshot = aggregate(&records);

        assert_eq!(snapshot.total_completed, 1);
        assert_eq!(snapshot.total_points, 50);
        assert_eq!(snapshot.perfect_scores, 0);
    }

    #[test]
    fn keyless_sessions_all_count() {
        let session = |score: i32| ActivityRecord {
            item_key: None,
            category: "pattern".to_string(),
            score,
            max_score: 0,
            completed_at: Some("2026-03-01T10:00:00+00:00".to_string()),
        };
        let snapshot = aggregate(&[session(30), session(40)]);

        assert_eq!(snapshot.total_completed, 2);
        assert_eq!(snapshot.category_count("pattern"), 2);
    }

    #[test]
    fn perfect_scores_require_hitting_max() {
        let records = vec![
            quiz("quiz:1", "math", 100, Some("2026-03-01T10:00:00+00:00")),
            quiz("quiz:2", "math", 99, Some("2026-03-01T11:00:00+00:00")),
        ];
        let snapshot = aggregate(&records);

        assert_eq!(snapshot.perfect_scores, 1);
    }

    #[test]
    fn best_subject_is_highest_average() {
        let records = vec![
            quiz("quiz:1", "math", 60, Some("2026-03-01T10:00:00+00:00")),
            quiz("quiz:2", "science", 90, Some("2026-03-01T11:00:00+00:00")),
            quiz("quiz:3", "science", 80, Some("2026-03-01T12:00:00+00:00")),
        ];
        let dashboard = dashboard_from(&records);

        assert_eq!(dashboard.best_subject, "science");
        assert_eq!(dashboard.total_completed, 3);
    }

    #[test]
    fn average_is_integer_rounded() {
        let records = vec![
            quiz("quiz:1", "math", 70, Some("2026-03-01T10:00:00+00:00")),
            quiz("quiz:2", "math", 75, Some("2026-03-01T11:00:00+00:00")),
        ];
        let dashboard = dashboard_from(&records);

        // 72.5 rounds up
        assert_eq!(dashboard.average_score, 73);
    }
}
