//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.

pub mod achievement_service;
pub mod game_service;
pub mod leaderboard_service;
pub mod report_service;
pub mod session_service;
pub mod stats_service;

use std::fmt;

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    InvalidState(String),
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Database(msg) => write!(f, "Database error: {}", msg),
            ServiceError::NotFound => write!(f, "Resource not found"),
            ServiceError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}
