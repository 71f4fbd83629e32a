//! Game session persistence
//!
//! The live `GameState` is authoritative for the player; the session row
//! is a best-effort mirror. A failed mirror write is logged and play
//! continues with the computed state.

use chrono::Utc;
use sea_orm::*;

use crate::models::game_session::{self, Entity as GameSession, SessionDto};
use crate::services::game_service::{
    Difficulty, GameEvent, GameKind, GameState, Phase, DEFAULT_ROUNDS,
};
use crate::services::ServiceError;

/// Create the session row at game start. The state machine is already
/// advanced past `Start`, matching the one-insert-at-launch flow.
pub async fn start_session(
    db: &DatabaseConnection,
    dto: SessionDto,
) -> Result<game_session::Model, ServiceError> {
    let kind = GameKind::parse(&dto.game_type).ok_or_else(|| {
        ServiceError::InvalidState(format!("unknown game type '{}'", dto.game_type))
    })?;
    let difficulty = match dto.difficulty.as_deref() {
        Some(raw) => Difficulty::parse(raw)
            .ok_or_else(|| ServiceError::InvalidState(format!("unknown difficulty '{}'", raw)))?,
        None => Difficulty::Easy,
    };

    let state = GameState::new(kind, difficulty, dto.total_rounds.unwrap_or(DEFAULT_ROUNDS))
        .apply(GameEvent::Start)?;

    let now = Utc::now().to_rfc3339();
    let row = game_session::ActiveModel {
        user_id: Set(dto.user_id),
        game_type: Set(kind.as_str().to_owned()),
        difficulty: Set(difficulty.as_str().to_owned()),
        grade: Set(dto.grade),
        current_round: Set(state.round),
        total_rounds: Set(state.total_rounds),
        answered_in_round: Set(0),
        score: Set(0),
        streak: Set(0),
        phase: Set(state.phase.as_str().to_owned()),
        completed_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = row.insert(db).await?;
    Ok(saved)
}

pub async fn get_session(
    db: &DatabaseConnection,
    id: i32,
) -> Result<game_session::Model, ServiceError> {
    GameSession::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)
}

/// Rebuild the reducer state from a mirrored row.
pub fn state_of(row: &game_session::Model) -> Result<GameState, ServiceError> {
    let kind = GameKind::parse(&row.game_type).ok_or_else(|| {
        ServiceError::InvalidState(format!("session {} has unknown game type", row.id))
    })?;
    let difficulty = Difficulty::parse(&row.difficulty).ok_or_else(|| {
        ServiceError::InvalidState(format!("session {} has unknown difficulty", row.id))
    })?;
    let phase = Phase::parse(&row.phase).ok_or_else(|| {
        ServiceError::InvalidState(format!("session {} has unknown phase", row.id))
    })?;

    Ok(GameState {
        kind,
        difficulty,
        round: row.current_round,
        total_rounds: row.total_rounds,
        answered_in_round: row.answered_in_round,
        score: row.score,
        streak: row.streak,
        phase,
    })
}

/// Apply one gameplay event. The computed state is returned even when the
/// mirror write fails; the second element reports whether the row caught up.
pub async fn apply_event(
    db: &DatabaseConnection,
    id: i32,
    event: GameEvent,
) -> Result<(GameState, bool), ServiceError> {
    let row = get_session(db, id).await?;
    if row.completed_at.is_some() {
        return Err(ServiceError::InvalidState(
            "session is already completed".to_string(),
        ));
    }

    let state = state_of(&row)?.apply(event)?;
    let mirrored = mirror_state(db, row, &state).await;

    Ok((state, mirrored))
}

async fn mirror_state(db: &DatabaseConnection, row: game_session::Model, state: &GameState) -> bool {
    let session_id = row.id;
    let now = Utc::now().to_rfc3339();

    let mut active: game_session::ActiveModel = row.into();
    active.current_round = Set(state.round);
    active.answered_in_round = Set(state.answered_in_round);
    active.score = Set(state.score);
    active.streak = Set(state.streak);
    active.phase = Set(state.phase.as_str().to_owned());
    if state.phase == Phase::Completed {
        active.completed_at = Set(Some(now.clone()));
    }
    active.updated_at = Set(now);

    match active.update(db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("mirror write for session {} failed: {}", session_id, e);
            false
        }
    }
}

/// Client-reported live counters, pushed periodically during play.
#[derive(Debug, serde::Deserialize)]
pub struct CounterSync {
    pub score: i32,
    pub streak: i32,
    pub current_round: i32,
}

/// Overwrite the mirrored counters with the client's live values.
/// Returns whether the write stuck; failure is logged, never fatal.
pub async fn sync_counters(
    db: &DatabaseConnection,
    id: i32,
    sync: CounterSync,
) -> Result<bool, ServiceError> {
    let row = get_session(db, id).await?;
    if row.completed_at.is_some() {
        return Err(ServiceError::InvalidState(
            "session is already completed".to_string(),
        ));
    }

    let session_id = row.id;
    let mut active: game_session::ActiveModel = row.into();
    active.score = Set(sync.score);
    active.streak = Set(sync.streak);
    active.current_round = Set(sync.current_round);
    active.updated_at = Set(Utc::now().to_rfc3339());

    match active.update(db).await {
        Ok(_) => Ok(true),
        Err(e) => {
            tracing::warn!("counter sync for session {} failed: {}", session_id, e);
            Ok(false)
        }
    }
}

/// Finalize the session. This write is the durable record the evaluator
/// and reports read, so unlike the in-play mirror it propagates errors.
pub async fn complete_session(
    db: &DatabaseConnection,
    id: i32,
) -> Result<game_session::Model, ServiceError> {
    let row = get_session(db, id).await?;
    if row.completed_at.is_some() {
        return Err(ServiceError::InvalidState(
            "session is already completed".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let mut active: game_session::ActiveModel = row.into();
    active.phase = Set(Phase::Completed.as_str().to_owned());
    active.completed_at = Set(Some(now.clone()));
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    Ok(updated)
}
