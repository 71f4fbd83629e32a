use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::services::report_service;

pub async fn grade_report(
    State(db): State<DatabaseConnection>,
    Path(grade): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let report = report_service::class_report(&db, grade)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "report": report })))
}

/// CSV download of the class report for spreadsheet-minded teachers.
pub async fn export_grade_report(
    State(db): State<DatabaseConnection>,
    Path(grade): Path<i32>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let report = report_service::class_report(&db, grade)
        .await
        .map_err(error_response)?;
    let csv = report_service::report_to_csv(&report).map_err(error_response)?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"grade_{}_report.csv\"", grade),
        ),
    ];

    Ok((headers, csv))
}
