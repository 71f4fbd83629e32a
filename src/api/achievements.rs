use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::services::achievement_service;

pub async fn list_definitions(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let definitions = achievement_service::load_enabled_definitions(&db)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "achievements": definitions })))
}

/// Every enabled badge with the user's earned flag and progress fraction,
/// earned first, then by descending progress.
pub async fn user_achievements(
    State(db): State<DatabaseConnection>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let statuses = achievement_service::achievements_for_user(&db, user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "achievements": statuses })))
}

/// Re-run the evaluator against the user's current stats.
pub async fn check_achievements(
    State(db): State<DatabaseConnection>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let newly_earned = achievement_service::evaluate_and_award(&db, user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "newly_earned": newly_earned })))
}
