use chrono::{Duration, Utc};
use sea_orm::*;

use crate::models::{game_session, quiz, quiz_attempt, user};

/// Seed a demo classroom: a teacher, a handful of students, quizzes across
/// subjects, completed attempts and one finished brain-training session.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Re-running with data present is a no-op
    if user::Entity::find().count(db).await? > 0 {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let now = Utc::now();
    let stamp = |offset_hours: i64| (now - Duration::hours(offset_hours)).to_rfc3339();

    // 1. Teacher and students
    let people: &[(&str, &str, &str, Option<i32>)] = &[
        ("ms_rivera", "Ms. Rivera", "teacher", None),
        ("ava_m", "Ava M.", "student", Some(4)),
        ("liam_k", "Liam K.", "student", Some(4)),
        ("noah_p", "Noah P.", "student", Some(5)),
    ];

    for (username, display_name, role, grade) in people {
        let row = user::ActiveModel {
            username: Set((*username).to_owned()),
            display_name: Set((*display_name).to_owned()),
            role: Set((*role).to_owned()),
            grade: Set(*grade),
            created_at: Set(stamp(72)),
            updated_at: Set(stamp(72)),
            ..Default::default()
        };
        row.insert(db).await?;
    }

    // 2. Quizzes across subjects (created by the teacher, id 1)
    let quizzes: &[(&str, &str, i32, i32)] = &[
        ("Fractions Basics", "math", 4, 100),
        ("Multiplication Sprint", "math", 4, 100),
        ("Plants & Seeds", "science", 4, 100),
        ("Reading Comprehension I", "english", 4, 100),
        ("Decimals Deep Dive", "math", 5, 100),
    ];

    for (title, subject, grade, max_score) in quizzes {
        let row = quiz::ActiveModel {
            title: Set((*title).to_owned()),
            subject: Set((*subject).to_owned()),
            grade: Set(*grade),
            question_count: Set(10),
            max_score: Set(*max_score),
            created_by: Set(Some(1)),
            created_at: Set(stamp(71)),
            updated_at: Set(stamp(71)),
            ..Default::default()
        };
        row.insert(db).await?;
    }

    // 3. Completed attempts, including a retake of quiz 1 by user 2
    let attempts: &[(i32, i32, i32, i64)] = &[
        (2, 1, 70, 48),
        (2, 1, 95, 24), // retake; only this one should count
        (2, 2, 100, 20),
        (2, 3, 80, 18),
        (3, 1, 60, 30),
        (3, 4, 85, 12),
        (4, 5, 90, 10),
    ];

    for (user_id, quiz_id, score, hours_ago) in attempts {
        let row = quiz_attempt::ActiveModel {
            user_id: Set(*user_id),
            quiz_id: Set(*quiz_id),
            score: Set(*score),
            max_score: Set(100),
            started_at: Set(stamp(*hours_ago + 1)),
            completed_at: Set(Some(stamp(*hours_ago))),
            created_at: Set(stamp(*hours_ago + 1)),
            updated_at: Set(stamp(*hours_ago)),
            ..Default::default()
        };
        row.insert(db).await?;
    }

    // 4. One finished pattern game for Ava
    let session = game_session::ActiveModel {
        user_id: Set(2),
        game_type: Set("pattern".to_owned()),
        difficulty: Set("easy".to_owned()),
        grade: Set(Some(4)),
        current_round: Set(5),
        total_rounds: Set(5),
        answered_in_round: Set(4),
        score: Set(180),
        streak: Set(6),
        phase: Set("completed".to_owned()),
        completed_at: Set(Some(stamp(6))),
        created_at: Set(stamp(7)),
        updated_at: Set(stamp(6)),
        ..Default::default()
    };
    session.insert(db).await?;

    tracing::info!("Demo classroom seeded");
    Ok(())
}
