use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::quiz::{self, Entity as Quiz, QuizDto};

#[derive(Deserialize)]
pub struct ListQuizzesQuery {
    pub subject: Option<String>,
    pub grade: Option<i32>,
}

pub async fn list_quizzes(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListQuizzesQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut condition = Condition::all();

    if let Some(subject) = query.subject {
        condition = condition.add(quiz::Column::Subject.eq(subject));
    }

    if let Some(grade) = query.grade {
        condition = condition.add(quiz::Column::Grade.eq(grade));
    }

    let quizzes = Quiz::find()
        .filter(condition)
        .order_by_asc(quiz::Column::Title)
        .all(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "quizzes": quizzes })))
}

pub async fn get_quiz(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let found = Quiz::find_by_id(id)
        .one(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Quiz not found".to_string()))?;

    Ok(Json(json!({ "quiz": found })))
}

pub async fn create_quiz(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<QuizDto>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }

    let now = Utc::now().to_rfc3339();
    let new_quiz = quiz::ActiveModel {
        title: Set(payload.title),
        subject: Set(payload.subject),
        grade: Set(payload.grade),
        question_count: Set(payload.question_count),
        max_score: Set(payload.max_score.unwrap_or(100)),
        created_by: Set(payload.created_by),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_quiz
        .insert(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "quiz": saved })))
}

pub async fn update_quiz(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<QuizDto>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let found = Quiz::find_by_id(id)
        .one(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Quiz not found".to_string()))?;

    let max_score = payload.max_score.unwrap_or(found.max_score);

    let mut active: quiz::ActiveModel = found.into();
    active.title = Set(payload.title);
    active.subject = Set(payload.subject);
    active.grade = Set(payload.grade);
    active.question_count = Set(payload.question_count);
    active.max_score = Set(max_score);
    active.updated_at = Set(Utc::now().to_rfc3339());

    let updated = active
        .update(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "quiz": updated })))
}

/// Destructive teacher action: unlike the best-effort learner writes,
/// failures here are surfaced to the caller.
pub async fn delete_quiz(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let found = Quiz::find_by_id(id)
        .one(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Quiz not found".to_string()))?;

    let title = found.title.clone();
    found.delete(&db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to delete quiz '{}': {}", title, e),
        )
    })?;

    Ok(Json(
        json!({ "message": format!("Quiz '{}' deleted", title) }),
    ))
}
