//! Transcript message operations.
//!
//! Messages are append-only; transcript order is `created_at` with the rowid
//! as a tiebreaker so same-millisecond inserts never reorder a turn.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::InterviewMessage;

/// Append one message to a session's transcript.
pub async fn append_message(
    pool: &SqlitePool,
    session_id: &str,
    role: &str,
    content: &str,
    created_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO interview_messages (session_id, role, content, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(session_id)
    .bind(role)
    .bind(content)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// The full ordered transcript for a session.
pub async fn list_messages(pool: &SqlitePool, session_id: &str) -> Result<Vec<InterviewMessage>> {
    let messages = sqlx::query_as::<_, InterviewMessage>(
        r#"
        SELECT id, session_id, role, content, created_at
        FROM interview_messages
        WHERE session_id = ?
        ORDER BY created_at, id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Count the messages in a session's transcript.
pub async fn count_messages(pool: &SqlitePool, session_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM interview_messages WHERE session_id = ?
        "#,
    )
    .bind(session_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
