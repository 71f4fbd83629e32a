use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'student',
            grade INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create quizzes table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS quizzes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            subject TEXT NOT NULL,
            grade INTEGER NOT NULL,
            question_count INTEGER NOT NULL DEFAULT 10,
            max_score INTEGER NOT NULL DEFAULT 100,
            created_by INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE SET NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create quiz_attempts table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS quiz_attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            quiz_id INTEGER NOT NULL,
            score INTEGER NOT NULL DEFAULT 0,
            max_score INTEGER NOT NULL DEFAULT 100,
            started_at TEXT NOT NULL,
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (quiz_id) REFERENCES quizzes(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create achievements table (definitions, read-only at runtime)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS achievements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            rule_key TEXT,
            points_required INTEGER NOT NULL DEFAULT 0,
            badge_color TEXT NOT NULL DEFAULT 'blue',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Migration: rule_key replaced dispatch on the display name.
    // If the column exists this fails, so we ignore errors (simple migration strategy)
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE achievements ADD COLUMN rule_key TEXT".to_owned(),
        ))
        .await;

    // Create earned_achievements table.
    // The UNIQUE pair is a backstop; the evaluator skips already-earned ids itself.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS earned_achievements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            achievement_id INTEGER NOT NULL,
            earned_at TEXT NOT NULL,
            UNIQUE (user_id, achievement_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (achievement_id) REFERENCES achievements(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create game_sessions table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS game_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            game_type TEXT NOT NULL,
            difficulty TEXT NOT NULL DEFAULT 'easy',
            grade INTEGER,
            current_round INTEGER NOT NULL DEFAULT 0,
            total_rounds INTEGER NOT NULL DEFAULT 5,
            answered_in_round INTEGER NOT NULL DEFAULT 0,
            score INTEGER NOT NULL DEFAULT 0,
            streak INTEGER NOT NULL DEFAULT 0,
            phase TEXT NOT NULL DEFAULT 'not_started',
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    seed_default_achievements(db).await?;

    Ok(())
}

/// Default achievement catalog. Rows are keyed by id so renaming a badge in
/// the UI never creates duplicates, and `rule_key` keeps the rule binding
/// stable across renames. `badge_color = 'none'` disables a definition.
async fn seed_default_achievements(db: &DatabaseConnection) -> Result<(), DbErr> {
    let defaults: &[(i32, &str, &str, &str, i32, &str)] = &[
        (
            1,
            "First Steps",
            "Complete your first quiz or game",
            "first_steps",
            10,
            "green",
        ),
        (
            2,
            "Quiz Explorer",
            "Complete 10 quizzes or games",
            "quiz_explorer",
            100,
            "blue",
        ),
        (
            3,
            "Math Whiz",
            "Complete 5 math activities",
            "math_whiz",
            150,
            "purple",
        ),
        (
            4,
            "Science Star",
            "Complete 5 science activities",
            "science_star",
            150,
            "teal",
        ),
        (
            5,
            "Word Wizard",
            "Complete 5 english activities",
            "word_wizard",
            150,
            "orange",
        ),
        (
            6,
            "Pattern Pro",
            "Finish 5 pattern recognition games",
            "pattern_pro",
            150,
            "pink",
        ),
        (
            7,
            "Logic Legend",
            "Finish 5 deductive reasoning games",
            "logic_legend",
            150,
            "red",
        ),
        (
            8,
            "Perfectionist",
            "Get a perfect score 3 times",
            "perfectionist",
            200,
            "gold",
        ),
        (
            9,
            "Point Collector",
            "Earn 500 points in total",
            "point_collector",
            500,
            "silver",
        ),
        // Requires timed-play tracking the platform does not collect yet
        (
            10,
            "Speed Demon",
            "Finish a timed round in under 10 seconds",
            "speed_demon",
            250,
            "yellow",
        ),
        // Requires day-over-day streak tracking
        (
            11,
            "Streak Master",
            "Play on 7 days in a row",
            "streak_master",
            300,
            "bronze",
        ),
        // Requires grade-specific validation
        (
            12,
            "Grade Ace",
            "Master every subject at your grade level",
            "grade_ace",
            400,
            "indigo",
        ),
        // Requires study groups
        (
            13,
            "Study Buddy",
            "Join a study group",
            "study_buddy",
            50,
            "cyan",
        ),
    ];

    for (id, name, description, rule_key, points, badge) in defaults {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            r#"
            INSERT OR IGNORE INTO achievements
                (id, name, description, rule_key, points_required, badge_color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))
            "#,
            [
                (*id).into(),
                (*name).into(),
                (*description).into(),
                (*rule_key).into(),
                (*points).into(),
                (*badge).into(),
            ],
        ))
        .await?;
    }

    Ok(())
}
