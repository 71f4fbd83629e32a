use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::user::{self, Entity as User, UserDto};

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub grade: Option<i32>,
}

pub async fn list_users(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut condition = Condition::all();

    if let Some(role) = query.role {
        condition = condition.add(user::Column::Role.eq(role));
    }

    if let Some(grade) = query.grade {
        condition = condition.add(user::Column::Grade.eq(grade));
    }

    let users = User::find()
        .filter(condition)
        .order_by_asc(user::Column::DisplayName)
        .all(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "users": users })))
}

pub async fn get_user(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let found = User::find_by_id(id)
        .one(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    Ok(Json(json!({ "user": found })))
}

pub async fn create_user(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<UserDto>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if payload.username.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "username is required".to_string()));
    }

    let role = payload.role.unwrap_or_else(|| "student".to_string());
    if role != "student" && role != "teacher" {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown role '{}'", role),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let new_user = user::ActiveModel {
        username: Set(payload.username),
        display_name: Set(payload.display_name),
        role: Set(role),
        grade: Set(payload.grade),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_user
        .insert(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "user": saved })))
}
