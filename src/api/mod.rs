pub mod achievements;
pub mod attempts;
pub mod dashboard;
pub mod health;
pub mod leaderboard;
pub mod quizzes;
pub mod reports;
pub mod sessions;
pub mod users;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;

use crate::services::ServiceError;

pub(crate) fn error_response(e: ServiceError) -> (StatusCode, String) {
    match e {
        ServiceError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        ServiceError::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg),
        ServiceError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        ServiceError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
    }
}

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", get(users::get_user))
        // Quizzes (teacher-facing CRUD)
        .route(
            "/quizzes",
            get(quizzes::list_quizzes).post(quizzes::create_quiz),
        )
        .route(
            "/quizzes/:id",
            get(quizzes::get_quiz)
                .put(quizzes::update_quiz)
                .delete(quizzes::delete_quiz),
        )
        // Quiz attempts
        .route("/attempts", post(attempts::submit_attempt))
        .route("/users/:id/attempts", get(attempts::list_user_attempts))
        // Achievements
        .route("/achievements", get(achievements::list_definitions))
        .route("/users/:id/achievements", get(achievements::user_achievements))
        .route(
            "/users/:id/achievements/check",
            post(achievements::check_achievements),
        )
        // Dashboard
        .route("/users/:id/dashboard", get(dashboard::get_dashboard))
        // Game sessions
        .route("/game-sessions", post(sessions::create_session))
        .route("/game-sessions/:id", get(sessions::get_session))
        .route("/game-sessions/:id/events", post(sessions::post_event))
        .route("/game-sessions/:id/sync", put(sessions::sync_session))
        .route(
            "/game-sessions/:id/complete",
            post(sessions::complete_session),
        )
        // Leaderboard
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        // Teacher reports
        .route("/reports/grade/:grade", get(reports::grade_report))
        .route(
            "/reports/grade/:grade/export",
            get(reports::export_grade_report),
        )
        .with_state(db)
}
