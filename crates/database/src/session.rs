//! Interview session operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::InterviewSession;

/// Create a new interview session.
pub async fn create_session(pool: &SqlitePool, session: &InterviewSession) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO interview_sessions
            (id, application_id, owner_id, phase, question_count, started_at,
             completed_at, overall_score, feedback_summary)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(&session.application_id)
    .bind(&session.owner_id)
    .bind(&session.phase)
    .bind(session.question_count)
    .bind(&session.started_at)
    .bind(&session.completed_at)
    .bind(session.overall_score)
    .bind(&session.feedback_summary)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "InterviewSession",
                    id: session.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a session by ID.
pub async fn get_session(pool: &SqlitePool, id: &str) -> Result<InterviewSession> {
    sqlx::query_as::<_, InterviewSession>(
        r#"
        SELECT id, application_id, owner_id, phase, question_count, started_at,
               completed_at, overall_score, feedback_summary
        FROM interview_sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "InterviewSession",
        id: id.to_string(),
    })
}

/// Get a session by ID, scoped to its owner.
///
/// Returns `NotFound` whether the session is missing or belongs to someone
/// else; callers that need to distinguish use [`get_session`] and compare
/// the owner themselves.
pub async fn get_session_for_owner(
    pool: &SqlitePool,
    id: &str,
    owner_id: &str,
) -> Result<InterviewSession> {
    sqlx::query_as::<_, InterviewSession>(
        r#"
        SELECT id, application_id, owner_id, phase, question_count, started_at,
               completed_at, overall_score, feedback_summary
        FROM interview_sessions
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "InterviewSession",
        id: id.to_string(),
    })
}

/// Persist a phase advance.
///
/// `completed_at` is written through `COALESCE`, so the first completion
/// timestamp sticks and later updates can pass `None` without clearing it.
pub async fn update_phase(
    pool: &SqlitePool,
    id: &str,
    phase: &str,
    question_count: i64,
    completed_at: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE interview_sessions
        SET phase = ?, question_count = ?, completed_at = COALESCE(completed_at, ?)
        WHERE id = ?
        "#,
    )
    .bind(phase)
    .bind(question_count)
    .bind(completed_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "InterviewSession",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all sessions for an application, newest first.
pub async fn list_sessions_for_application(
    pool: &SqlitePool,
    application_id: &str,
) -> Result<Vec<InterviewSession>> {
    let sessions = sqlx::query_as::<_, InterviewSession>(
        r#"
        SELECT id, application_id, owner_id, phase, question_count, started_at,
               completed_at, overall_score, feedback_summary
        FROM interview_sessions
        WHERE application_id = ?
        ORDER BY started_at DESC
        "#,
    )
    .bind(application_id)
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}
