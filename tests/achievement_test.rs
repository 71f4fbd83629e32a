//! Achievement evaluator tests
//!
//! Covers rule dispatch, idempotent awarding, disabled rules and the
//! earned-first progress ordering.

use std::collections::HashMap;

use mindforge::db;
use mindforge::models::{achievement, earned_achievement, quiz, quiz_attempt, user};
use mindforge::services::achievement_service;
use mindforge::services::stats_service::UserStatsSnapshot;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_student(db: &DatabaseConnection, username: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let student = user::ActiveModel {
        username: Set(username.to_string()),
        display_name: Set(username.to_string()),
        role: Set("student".to_string()),
        grade: Set(Some(4)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = user::Entity::insert(student)
        .exec(db)
        .await
        .expect("Failed to create student");
    res.last_insert_id
}

async fn create_test_quiz(db: &DatabaseConnection, title: &str, subject: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let q = quiz::ActiveModel {
        title: Set(title.to_string()),
        subject: Set(subject.to_string()),
        grade: Set(4),
        question_count: Set(10),
        max_score: Set(100),
        created_by: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = quiz::Entity::insert(q)
        .exec(db)
        .await
        .expect("Failed to create quiz");
    res.last_insert_id
}

async fn complete_attempt(db: &DatabaseConnection, user_id: i32, quiz_id: i32, score: i32) {
    let now = chrono::Utc::now().to_rfc3339();
    let attempt = quiz_attempt::ActiveModel {
        user_id: Set(user_id),
        quiz_id: Set(quiz_id),
        score: Set(score),
        max_score: Set(100),
        started_at: Set(now.clone()),
        completed_at: Set(Some(now.clone())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    attempt.insert(db).await.expect("Failed to create attempt");
}

fn snapshot(
    total_points: i64,
    total_completed: u64,
    categories: &[(&str, u64)],
    perfect_scores: u64,
) -> UserStatsSnapshot {
    UserStatsSnapshot {
        total_points,
        total_completed,
        per_category: categories
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>(),
        perfect_scores,
    }
}

async fn definition_named(db: &DatabaseConnection, name: &str) -> achievement::Model {
    achievement::Entity::find()
        .filter(achievement::Column::Name.eq(name))
        .one(db)
        .await
        .expect("Failed to query achievements")
        .expect("Definition not seeded")
}

#[tokio::test]
async fn math_whiz_qualifies_at_five_math_activities() {
    let db = setup_test_db().await;
    let def = definition_named(&db, "Math Whiz").await;

    let stats = snapshot(400, 5, &[("math", 5)], 0);
    assert!(achievement_service::qualifies(&stats, &def));
    assert_eq!(achievement_service::progress(&stats, &def), 1.0);
}

#[tokio::test]
async fn math_whiz_progress_is_fractional_below_threshold() {
    let db = setup_test_db().await;
    let def = definition_named(&db, "Math Whiz").await;

    let stats = snapshot(400, 4, &[("math", 4)], 0);
    assert!(!achievement_service::qualifies(&stats, &def));
    assert_eq!(achievement_service::progress(&stats, &def), 0.8);
}

#[tokio::test]
async fn progress_is_monotonic_and_hits_one_only_when_qualified() {
    let db = setup_test_db().await;
    let def = definition_named(&db, "Math Whiz").await;

    let mut previous = -1.0f32;
    for count in 0..8u64 {
        let stats = snapshot(0, count, &[("math", count)], 0);
        let p = achievement_service::progress(&stats, &def);
        assert!(p >= previous, "progress regressed at count {}", count);
        assert_eq!(
            p == 1.0,
            achievement_service::qualifies(&stats, &def),
            "progress and qualification disagree at count {}",
            count
        );
        previous = p;
    }
}

#[tokio::test]
async fn disabled_rules_never_qualify() {
    let db = setup_test_db().await;

    for name in ["Speed Demon", "Streak Master", "Grade Ace", "Study Buddy"] {
        let def = definition_named(&db, name).await;
        // stats that would blow past any points threshold
        let stats = snapshot(1_000_000, 500, &[("math", 500)], 100);
        assert!(
            !achievement_service::qualifies(&stats, &def),
            "{} should be hard-disabled",
            name
        );
        assert_eq!(achievement_service::progress(&stats, &def), 0.0);
    }
}

#[tokio::test]
async fn unknown_rule_key_falls_back_to_points_threshold() {
    let db = setup_test_db().await;

    let now = chrono::Utc::now().to_rfc3339();
    let custom = achievement::ActiveModel {
        name: Set("Homework Hero".to_string()),
        description: Set("Custom badge".to_string()),
        rule_key: Set(Some("not_a_known_rule".to_string())),
        points_required: Set(120),
        badge_color: Set("blue".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let custom = custom.insert(&db).await.expect("Failed to insert");

    let below = snapshot(119, 2, &[], 0);
    let above = snapshot(120, 2, &[], 0);
    assert!(!achievement_service::qualifies(&below, &custom));
    assert!(achievement_service::qualifies(&above, &custom));
}

#[tokio::test]
async fn renaming_a_badge_does_not_detach_its_rule() {
    let db = setup_test_db().await;
    let def = definition_named(&db, "Math Whiz").await;

    let mut active: achievement::ActiveModel = def.into();
    active.name = Set("Numbers Ninja".to_string());
    let renamed = active.update(&db).await.expect("Failed to rename");

    let stats = snapshot(0, 5, &[("math", 5)], 0);
    assert!(achievement_service::qualifies(&stats, &renamed));
}

#[tokio::test]
async fn sentinel_badge_color_disables_a_definition() {
    let db = setup_test_db().await;
    let def = definition_named(&db, "First Steps").await;

    let mut active: achievement::ActiveModel = def.into();
    active.badge_color = Set("none".to_string());
    active.update(&db).await.expect("Failed to disable");

    let definitions = achievement_service::load_enabled_definitions(&db)
        .await
        .expect("Failed to load definitions");
    assert!(definitions.iter().all(|d| d.name != "First Steps"));

    let user_id = create_test_student(&db, "mia").await;
    let quiz_id = create_test_quiz(&db, "Fractions", "math").await;
    complete_attempt(&db, user_id, quiz_id, 80).await;

    let awarded = achievement_service::evaluate_and_award(&db, user_id)
        .await
        .expect("Evaluation failed");
    assert!(awarded.iter().all(|d| d.name != "First Steps"));
}

#[tokio::test]
async fn evaluator_awards_math_whiz_exactly_once() {
    let db = setup_test_db().await;
    let user_id = create_test_student(&db, "ava").await;

    for i in 0..5 {
        let quiz_id = create_test_quiz(&db, &format!("Math Quiz {}", i), "math").await;
        complete_attempt(&db, user_id, quiz_id, 80).await;
    }

    let first = achievement_service::evaluate_and_award(&db, user_id)
        .await
        .expect("First evaluation failed");
    assert!(first.iter().any(|d| d.name == "Math Whiz"));

    // Second pass with unchanged stats must award nothing
    let second = achievement_service::evaluate_and_award(&db, user_id)
        .await
        .expect("Second evaluation failed");
    assert!(second.is_empty(), "evaluator is not idempotent: {:?}", second);

    let math_whiz = definition_named(&db, "Math Whiz").await;
    let rows = earned_achievement::Entity::find()
        .filter(earned_achievement::Column::UserId.eq(user_id))
        .filter(earned_achievement::Column::AchievementId.eq(math_whiz.id))
        .count(&db)
        .await
        .expect("Failed to count earned rows");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn listing_sorts_earned_first_then_by_progress() {
    let db = setup_test_db().await;
    let user_id = create_test_student(&db, "liam").await;

    // Three completed math quizzes: First Steps earned, Math Whiz at 3/5
    for i in 0..3 {
        let quiz_id = create_test_quiz(&db, &format!("Quiz {}", i), "math").await;
        complete_attempt(&db, user_id, quiz_id, 90).await;
    }
    achievement_service::evaluate_and_award(&db, user_id)
        .await
        .expect("Evaluation failed");

    let statuses = achievement_service::achievements_for_user(&db, user_id)
        .await
        .expect("Listing failed");

    let first_unearned = statuses
        .iter()
        .position(|s| !s.earned)
        .expect("Everything earned?");
    assert!(
        statuses[..first_unearned].iter().all(|s| s.earned),
        "earned badges must lead the list"
    );
    let rest = &statuses[first_unearned..];
    assert!(
        rest.windows(2).all(|w| w[0].progress >= w[1].progress),
        "unearned badges must be ordered by descending progress"
    );
}
