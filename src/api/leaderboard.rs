use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::services::leaderboard_service;

const DEFAULT_LIMIT: usize = 25;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub grade: Option<i32>,
    pub limit: Option<usize>,
}

pub async fn get_leaderboard(
    State(db): State<DatabaseConnection>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = leaderboard_service::leaderboard(&db, query.grade, limit)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "leaderboard": entries })))
}
