//! Teacher-facing class reports.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;

use crate::models::user::{self, Entity as User};
use crate::services::stats_service::{self, SubjectAverage};
use crate::services::ServiceError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct StudentSummary {
    pub user_id: i32,
    pub display_name: String,
    pub activities_completed: u64,
    pub total_points: i64,
    pub average_score: i64,
    pub best_subject: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassReport {
    pub grade: i32,
    pub student_count: usize,
    pub students: Vec<StudentSummary>,
    pub subjects: Vec<SubjectAverage>,
    pub generated_at: String,
}

/// Aggregate one grade's students: per-student summaries plus subject
/// averages pooled across the whole class.
pub async fn class_report(db: &DatabaseConnection, grade: i32) -> Result<ClassReport, ServiceError> {
    let students = User::find()
        .filter(user::Column::Role.eq("student"))
        .filter(user::Column::Grade.eq(grade))
        .order_by_asc(user::Column::DisplayName)
        .all(db)
        .await?;

    let mut activity = stats_service::activity_by_user(db).await?;

    let mut summaries = Vec::with_capacity(students.len());
    let mut class_subjects: HashMap<String, (u64, i64)> = HashMap::new();

    for student in students {
        let records = activity.remove(&student.id).unwrap_or_default();
        let dashboard = stats_service::dashboard_from(&records);

        for subject in &dashboard.subjects {
            let entry = class_subjects.entry(subject.subject.clone()).or_insert((0, 0));
            entry.0 += subject.attempts;
            entry.1 += subject.average * subject.attempts as i64;
        }

        summaries.push(StudentSummary {
            user_id: student.id,
            display_name: student.display_name,
            activities_completed: dashboard.total_completed,
            total_points: dashboard.total_points,
            average_score: dashboard.average_score,
            best_subject: dashboard.best_subject,
        });
    }

    let mut subjects: Vec<SubjectAverage> = class_subjects
        .into_iter()
        .map(|(subject, (attempts, points))| SubjectAverage {
            subject,
            attempts,
            average: if attempts == 0 {
                0
            } else {
                (points as f64 / attempts as f64).round() as i64
            },
        })
        .collect();
    subjects.sort_by(|a, b| a.subject.cmp(&b.subject));

    Ok(ClassReport {
        grade,
        student_count: summaries.len(),
        students: summaries,
        subjects,
        generated_at: Utc::now().to_rfc3339(),
    })
}

/// Render a class report as CSV for download.
pub fn report_to_csv(report: &ClassReport) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "student",
            "activities_completed",
            "total_points",
            "average_score",
            "best_subject",
        ])
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

    for student in &report.students {
        writer
            .write_record([
                student.display_name.as_str(),
                &student.activities_completed.to_string(),
                &student.total_points.to_string(),
                &student.average_score.to_string(),
                student.best_subject.as_str(),
            ])
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(e.to_string()))
}
