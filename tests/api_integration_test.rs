//! End-to-end service flow over the seeded demo classroom.

use mindforge::db;
use mindforge::seed;
use mindforge::services::{
    achievement_service, leaderboard_service, report_service, stats_service,
};
use sea_orm::DatabaseConnection;

async fn setup_seeded_db() -> DatabaseConnection {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_demo_data(&db).await.expect("Failed to seed");
    db
}

// Seeded classroom: Ms. Rivera (1), Ava grade 4 (2), Liam grade 4 (3),
// Noah grade 5 (4). Ava retook quiz 1 (70 then 95), aced quiz 2 (100),
// scored 80 in science and finished a 180-point pattern game.

#[tokio::test]
async fn dashboard_counts_the_retake_once() {
    let db = setup_seeded_db().await;

    let dashboard = stats_service::dashboard_for_user(&db, 2)
        .await
        .expect("Dashboard failed");

    // 3 distinct quizzes + 1 game session
    assert_eq!(dashboard.total_completed, 4);
    // 95 + 100 + 80 + 180, the 70-point first try does not count
    assert_eq!(dashboard.total_points, 455);
    assert_eq!(dashboard.average_score, 114);
    assert_eq!(dashboard.perfect_scores, 1);
}

#[tokio::test]
async fn dashboard_of_inactive_user_is_neutral() {
    let db = setup_seeded_db().await;

    // the teacher has no attempts
    let dashboard = stats_service::dashboard_for_user(&db, 1)
        .await
        .expect("Dashboard failed");

    assert_eq!(dashboard.total_completed, 0);
    assert_eq!(dashboard.average_score, 0);
    assert_eq!(dashboard.best_subject, "None");
}

#[tokio::test]
async fn submitting_attempts_unlocks_first_steps() {
    let db = setup_seeded_db().await;

    let newly = achievement_service::evaluate_and_award(&db, 2)
        .await
        .expect("Evaluation failed");

    assert!(newly.iter().any(|d| d.name == "First Steps"));
    // 2 math quizzes is short of Math Whiz
    assert!(newly.iter().all(|d| d.name != "Math Whiz"));

    let again = achievement_service::evaluate_and_award(&db, 2)
        .await
        .expect("Second evaluation failed");
    assert!(again.is_empty());
}

#[tokio::test]
async fn leaderboard_ranks_grade_four_by_points() {
    let db = setup_seeded_db().await;

    let entries = leaderboard_service::leaderboard(&db, Some(4), 25)
        .await
        .expect("Leaderboard failed");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].display_name, "Ava M.");
    assert_eq!(entries[0].rank, 1);
    assert_eq!(entries[0].total_points, 455);
    assert_eq!(entries[1].display_name, "Liam K.");
    assert_eq!(entries[1].total_points, 145);
}

#[tokio::test]
async fn leaderboard_without_grade_filter_includes_all_students() {
    let db = setup_seeded_db().await;

    let entries = leaderboard_service::leaderboard(&db, None, 25)
        .await
        .expect("Leaderboard failed");

    assert_eq!(entries.len(), 3);
    // teacher accounts never appear
    assert!(entries.iter().all(|e| e.display_name != "Ms. Rivera"));
}

#[tokio::test]
async fn class_report_covers_every_grade_four_student() {
    let db = setup_seeded_db().await;

    let report = report_service::class_report(&db, 4)
        .await
        .expect("Report failed");

    assert_eq!(report.grade, 4);
    assert_eq!(report.student_count, 2);

    let ava = report
        .students
        .iter()
        .find(|s| s.display_name == "Ava M.")
        .expect("Ava missing from report");
    assert_eq!(ava.activities_completed, 4);
    assert_eq!(ava.total_points, 455);

    assert!(report.subjects.iter().any(|s| s.subject == "math"));
    assert!(report.subjects.iter().any(|s| s.subject == "science"));
}

#[tokio::test]
async fn class_report_exports_as_csv() {
    let db = setup_seeded_db().await;

    let report = report_service::class_report(&db, 4)
        .await
        .expect("Report failed");
    let bytes = report_service::report_to_csv(&report).expect("CSV export failed");
    let text = String::from_utf8(bytes).expect("CSV is not UTF-8");

    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("student,activities_completed,total_points,average_score,best_subject")
    );
    assert_eq!(lines.count(), 2, "one row per student");
}

#[tokio::test]
async fn seeding_twice_is_a_no_op() {
    let db = setup_seeded_db().await;

    seed::seed_demo_data(&db).await.expect("Reseed failed");

    let entries = leaderboard_service::leaderboard(&db, None, 100)
        .await
        .expect("Leaderboard failed");
    assert_eq!(entries.len(), 3);
}
