use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::models::game_session::SessionDto;
use crate::services::achievement_service;
use crate::services::game_service::GameEvent;
use crate::services::session_service::{self, CounterSync};

pub async fn create_session(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<SessionDto>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session = session_service::start_session(&db, payload)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "session": session })))
}

pub async fn get_session(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session = session_service::get_session(&db, id)
        .await
        .map_err(error_response)?;
    let state = session_service::state_of(&session).map_err(error_response)?;

    Ok(Json(json!({ "session": session, "state": state })))
}

/// Apply one gameplay event. `mirrored: false` means the computed state
/// did not reach the row; play continues regardless.
pub async fn post_event(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(event): Json<GameEvent>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let (state, mirrored) = session_service::apply_event(&db, id, event)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "state": state, "mirrored": mirrored })))
}

/// Best-effort counter mirror pushed by the client during play.
pub async fn sync_session(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<CounterSync>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mirrored = session_service::sync_counters(&db, id, payload)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "mirrored": mirrored })))
}

/// Finalize the session and re-run the achievement evaluator.
pub async fn complete_session(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session = session_service::complete_session(&db, id)
        .await
        .map_err(error_response)?;

    let newly_earned = achievement_service::evaluate_and_award(&db, session.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "session": session,
        "newly_earned": newly_earned,
    })))
}
