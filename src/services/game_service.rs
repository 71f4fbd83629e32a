//! Brain-training game engine
//!
//! One reducer owns every transition of a playthrough; the HTTP layer and
//! the tests both go through `GameState::apply`.

use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

pub const DEFAULT_ROUNDS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Pattern,
    Sequence,
    Logic,
}

impl GameKind {
    pub fn parse(raw: &str) -> Option<GameKind> {
        match raw {
            "pattern" => Some(GameKind::Pattern),
            "sequence" => Some(GameKind::Sequence),
            "logic" => Some(GameKind::Logic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Pattern => "pattern",
            GameKind::Sequence => "sequence",
            GameKind::Logic => "logic",
        }
    }

    /// Puzzles a player answers per round.
    pub fn answers_per_round(self) -> i32 {
        match self {
            GameKind::Pattern => 4,
            GameKind::Sequence => 3,
            GameKind::Logic => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Difficulty> {
        match raw {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn base_points(self) -> i32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    InProgress,
    AnswerPending,
    RoundComplete,
    Completed,
}

impl Phase {
    pub fn parse(raw: &str) -> Option<Phase> {
        match raw {
            "not_started" => Some(Phase::NotStarted),
            "in_progress" => Some(Phase::InProgress),
            "answer_pending" => Some(Phase::AnswerPending),
            "round_complete" => Some(Phase::RoundComplete),
            "completed" => Some(Phase::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::InProgress => "in_progress",
            Phase::AnswerPending => "answer_pending",
            Phase::RoundComplete => "round_complete",
            Phase::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Start,
    /// A puzzle is shown; the clock is running.
    Present,
    Answer {
        correct: bool,
        time_remaining: i32,
        hints_used: i32,
    },
    /// The per-puzzle timer ran out. Counts as a wrong answer.
    TimeExpired,
    NextRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameState {
    pub kind: GameKind,
    pub difficulty: Difficulty,
    pub round: i32,
    pub total_rounds: i32,
    pub answered_in_round: i32,
    pub score: i32,
    pub streak: i32,
    pub phase: Phase,
}

impl GameState {
    pub fn new(kind: GameKind, difficulty: Difficulty, total_rounds: i32) -> GameState {
        GameState {
            kind,
            difficulty,
            round: 0,
            total_rounds: total_rounds.max(1),
            answered_in_round: 0,
            score: 0,
            streak: 0,
            phase: Phase::NotStarted,
        }
    }

    pub fn apply(mut self, event: GameEvent) -> Result<GameState, ServiceError> {
        match (self.phase, event) {
            (Phase::NotStarted, GameEvent::Start) => {
                self.round = 1;
                self.phase = Phase::InProgress;
            }
            (Phase::InProgress, GameEvent::Present) => {
                self.phase = Phase::AnswerPending;
            }
            (
                Phase::AnswerPending,
                GameEvent::Answer {
                    correct,
                    time_remaining,
                    hints_used,
                },
            ) => {
                self.resolve_answer(correct, time_remaining, hints_used);
            }
            (Phase::AnswerPending, GameEvent::TimeExpired) => {
                self.resolve_answer(false, 0, 0);
            }
            (Phase::RoundComplete, GameEvent::NextRound) => {
                if self.round >= self.total_rounds {
                    self.phase = Phase::Completed;
                } else {
                    self.round += 1;
                    self.answered_in_round = 0;
                    self.phase = Phase::InProgress;
                }
            }
            (phase, event) => {
                return Err(ServiceError::InvalidState(format!(
                    "event {:?} not valid in phase '{}'",
                    event,
                    phase.as_str()
                )));
            }
        }
        Ok(self)
    }

    fn resolve_answer(&mut self, correct: bool, time_remaining: i32, hints_used: i32) {
        if correct {
            self.score += score_answer(
                self.kind,
                self.difficulty,
                self.round,
                time_remaining,
                self.streak,
                hints_used,
            );
            self.streak += 1;
        } else {
            self.streak = 0;
        }

        self.answered_in_round += 1;
        self.phase = if self.answered_in_round >= self.kind.answers_per_round() {
            Phase::RoundComplete
        } else {
            Phase::InProgress
        };
    }
}

/// Points for one correct answer. Bonuses and penalties can never drag a
/// correct answer below the round base.
pub fn score_answer(
    kind: GameKind,
    difficulty: Difficulty,
    round: i32,
    time_remaining: i32,
    streak: i32,
    hints_used: i32,
) -> i32 {
    let base = difficulty.base_points() + (round - 1).max(0) * 2;
    let time_bonus = time_remaining.max(0) / 2;
    let streak_bonus = streak.min(5) * 2;
    let hint_penalty = hints_used.max(0) * 5;
    let kind_bonus = match kind {
        GameKind::Pattern => 0,
        // sequences grow longer each round
        GameKind::Sequence => round,
        // clean deductions, no hints
        GameKind::Logic => {
            if hints_used == 0 {
                5
            } else {
                0
            }
        }
    };

    (base + time_bonus + streak_bonus + kind_bonus - hint_penalty).max(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(kind: GameKind) -> GameState {
        GameState::new(kind, Difficulty::Easy, 2)
            .apply(GameEvent::Start)
            .unwrap()
    }

    #[test]
    fn correct_answer_increments_streak_by_one() {
        let state = started(GameKind::Logic)
            .apply(GameEvent::Present)
            .unwrap()
            .apply(GameEvent::Answer {
                correct: true,
                time_remaining: 10,
                hints_used: 0,
            })
            .unwrap();

        assert_eq!(state.streak, 1);
        assert!(state.score > 0);
    }

    #[test]
    fn wrong_answer_resets_streak() {
        let mut state = started(GameKind::Pattern);
        for _ in 0..2 {
            state = state
                .apply(GameEvent::Present)
                .unwrap()
                .apply(GameEvent::Answer {
                    correct: true,
                    time_remaining: 5,
                    hints_used: 0,
                })
                .unwrap();
        }
        assert_eq!(state.streak, 2);

        let state = state
            .apply(GameEvent::Present)
            .unwrap()
            .apply(GameEvent::Answer {
                correct: false,
                time_remaining: 5,
                hints_used: 0,
            })
            .unwrap();

        assert_eq!(state.streak, 0);
    }

    #[test]
    fn timeout_counts_as_wrong_answer() {
        let state = started(GameKind::Sequence)
            .apply(GameEvent::Present)
            .unwrap()
            .apply(GameEvent::Answer {
                correct: true,
                time_remaining: 8,
                hints_used: 0,
            })
            .unwrap();
        let score_before = state.score;

        let state = state
            .apply(GameEvent::Present)
            .unwrap()
            .apply(GameEvent::TimeExpired)
            .unwrap();

        assert_eq!(state.streak, 0);
        assert_eq!(state.score, score_before);
        assert_eq!(state.answered_in_round, 2);
    }

    #[test]
    fn hints_never_drag_a_correct_answer_below_base() {
        let points = score_answer(GameKind::Pattern, Difficulty::Easy, 1, 0, 0, 20);
        assert_eq!(points, Difficulty::Easy.base_points());
    }

    #[test]
    fn round_completes_after_per_kind_answer_count() {
        let mut state = started(GameKind::Logic); // 3 answers per round
        for _ in 0..3 {
            state = state
                .apply(GameEvent::Present)
                .unwrap()
                .apply(GameEvent::Answer {
                    correct: true,
                    time_remaining: 0,
                    hints_used: 0,
                })
                .unwrap();
        }

        assert_eq!(state.phase, Phase::RoundComplete);
        assert_eq!(state.round, 1);
    }

    #[test]
    fn final_round_transitions_to_completed() {
        let mut state = started(GameKind::Logic);
        for round in 0..2 {
            for _ in 0..3 {
                state = state
                    .apply(GameEvent::Present)
                    .unwrap()
                    .apply(GameEvent::TimeExpired)
                    .unwrap();
            }
            state = state.apply(GameEvent::NextRound).unwrap();
            if round == 0 {
                assert_eq!(state.phase, Phase::InProgress);
                assert_eq!(state.round, 2);
            }
        }

        assert_eq!(state.phase, Phase::Completed);
    }

    #[test]
    fn answer_outside_answer_pending_is_rejected() {
        let result = started(GameKind::Pattern).apply(GameEvent::Answer {
            correct: true,
            time_remaining: 5,
            hints_used: 0,
        });

        assert!(result.is_err());
    }

    #[test]
    fn streak_bonus_caps_at_five() {
        let capped = score_answer(GameKind::Pattern, Difficulty::Hard, 3, 0, 5, 0);
        let beyond = score_answer(GameKind::Pattern, Difficulty::Hard, 3, 0, 9, 0);
        assert_eq!(capped, beyond);
    }
}
