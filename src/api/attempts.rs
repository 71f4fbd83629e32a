use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::*;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::models::quiz::Entity as Quiz;
use crate::models::quiz_attempt::{self, AttemptDto, Entity as QuizAttempt};
use crate::models::user::Entity as User;
use crate::services::achievement_service;

/// Record a quiz attempt. A completed attempt immediately re-runs the
/// achievement evaluator; whatever it unlocks rides back in the response.
pub async fn submit_attempt(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<AttemptDto>,
) -> Result<Json<Value>, (StatusCode, String)> {
    User::find_by_id(payload.user_id)
        .one(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let quiz = Quiz::find_by_id(payload.quiz_id)
        .one(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Quiz not found".to_string()))?;

    let max_score = payload.max_score.unwrap_or(quiz.max_score);
    if payload.score < 0 || payload.score > max_score {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("score must be between 0 and {}", max_score),
        ));
    }

    let completed = payload.completed.unwrap_or(true);
    let now = Utc::now().to_rfc3339();

    let attempt = quiz_attempt::ActiveModel {
        user_id: Set(payload.user_id),
        quiz_id: Set(payload.quiz_id),
        score: Set(payload.score),
        max_score: Set(max_score),
        started_at: Set(now.clone()),
        completed_at: Set(completed.then(|| now.clone())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = attempt
        .insert(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let newly_earned = if completed {
        achievement_service::evaluate_and_award(&db, payload.user_id)
            .await
            .map_err(error_response)?
    } else {
        Vec::new()
    };

    Ok(Json(json!({
        "attempt": saved,
        "newly_earned": newly_earned,
    })))
}

pub async fn list_user_attempts(
    State(db): State<DatabaseConnection>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let attempts = QuizAttempt::find()
        .filter(quiz_attempt::Column::UserId.eq(user_id))
        .order_by_desc(quiz_attempt::Column::StartedAt)
        .all(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "attempts": attempts })))
}
