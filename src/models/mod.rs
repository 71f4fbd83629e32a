pub mod achievement;
pub mod earned_achievement;
pub mod game_session;
pub mod quiz;
pub mod quiz_attempt;
pub mod user;
