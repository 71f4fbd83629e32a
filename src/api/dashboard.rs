use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::services::stats_service;

pub async fn get_dashboard(
    State(db): State<DatabaseConnection>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let dashboard = stats_service::dashboard_for_user(&db, user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "dashboard": dashboard })))
}
