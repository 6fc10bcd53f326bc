//! SQLite persistence layer for the interview coach.
//!
//! This crate provides async database operations for applications, coaching
//! sessions, and transcript messages using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::InterviewSession, session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:coach.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a session
//!     let session = InterviewSession {
//!         id: "7e6f6f3a-5d55-4bb7-9f0e-0e43c4f95c11".to_string(),
//!         application_id: "app-1".to_string(),
//!         owner_id: "user-1".to_string(),
//!         phase: "INTRO".to_string(),
//!         question_count: 0,
//!         started_at: "2026-08-05T10:00:00Z".to_string(),
//!         completed_at: None,
//!         overall_score: None,
//!         feedback_summary: None,
//!     };
//!     session::create_session(db.pool(), &session).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod error;
pub mod message;
pub mod models;
pub mod session;

pub use error::{DatabaseError, Result};
pub use models::{Application, InterviewMessage, InterviewSession};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Produce an RFC 3339 timestamp for row creation.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent turn processing.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/coach.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn test_application(id: &str, owner: &str) -> Application {
        Application {
            id: id.to_string(),
            owner_id: owner.to_string(),
            company_name: "Acme".to_string(),
            job_title: "Backend Engineer".to_string(),
            vacancy_text: Some("Build services.".to_string()),
            cv_snapshot: None,
            culture_summary: Some("informal startup".to_string()),
            recent_news: None,
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
        }
    }

    fn test_session(id: &str, application_id: &str, owner: &str) -> InterviewSession {
        InterviewSession {
            id: id.to_string(),
            application_id: application_id.to_string(),
            owner_id: owner.to_string(),
            phase: "INTRO".to_string(),
            question_count: 0,
            started_at: now_rfc3339(),
            completed_at: None,
            overall_score: None,
            feedback_summary: None,
        }
    }

    #[tokio::test]
    async fn test_session_crud() {
        let db = test_db().await;
        application::create_application(db.pool(), &test_application("app-1", "user-1"))
            .await
            .unwrap();

        // Create
        let sess = test_session("sess-1", "app-1", "user-1");
        session::create_session(db.pool(), &sess).await.unwrap();

        // Duplicate ID is rejected
        let dup = session::create_session(db.pool(), &sess).await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));

        // Read
        let fetched = session::get_session(db.pool(), "sess-1").await.unwrap();
        assert_eq!(fetched.phase, "INTRO");
        assert_eq!(fetched.question_count, 0);

        // Owner-scoped read
        let fetched = session::get_session_for_owner(db.pool(), "sess-1", "user-1")
            .await
            .unwrap();
        assert_eq!(fetched.id, "sess-1");
        let missing = session::get_session_for_owner(db.pool(), "sess-1", "user-2").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));

        // Phase update
        session::update_phase(db.pool(), "sess-1", "ASK", 0, None)
            .await
            .unwrap();
        let fetched = session::get_session(db.pool(), "sess-1").await.unwrap();
        assert_eq!(fetched.phase, "ASK");
        assert!(fetched.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_completed_at_sticks() {
        let db = test_db().await;
        application::create_application(db.pool(), &test_application("app-1", "user-1"))
            .await
            .unwrap();
        session::create_session(db.pool(), &test_session("sess-1", "app-1", "user-1"))
            .await
            .unwrap();

        session::update_phase(db.pool(), "sess-1", "COMPLETED", 12, Some("2026-08-05T11:00:00Z"))
            .await
            .unwrap();
        // A later update without a timestamp keeps the original.
        session::update_phase(db.pool(), "sess-1", "COMPLETED", 12, None)
            .await
            .unwrap();

        let fetched = session::get_session(db.pool(), "sess-1").await.unwrap();
        assert_eq!(fetched.completed_at.as_deref(), Some("2026-08-05T11:00:00Z"));
    }

    #[tokio::test]
    async fn test_transcript_order_survives_same_timestamp() {
        let db = test_db().await;
        application::create_application(db.pool(), &test_application("app-1", "user-1"))
            .await
            .unwrap();
        session::create_session(db.pool(), &test_session("sess-1", "app-1", "user-1"))
            .await
            .unwrap();

        let ts = "2026-08-05T10:30:00Z";
        message::append_message(db.pool(), "sess-1", "user", "first", ts)
            .await
            .unwrap();
        message::append_message(db.pool(), "sess-1", "assistant", "second", ts)
            .await
            .unwrap();

        let messages = message::list_messages(db.pool(), "sess-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert_eq!(message::count_messages(db.pool(), "sess-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_phase_missing_session() {
        let db = test_db().await;
        let result = session::update_phase(db.pool(), "nope", "ASK", 0, None).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
