//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job application fact sheet, owned by the surrounding product.
///
/// Read-only to the coaching engine: its fields color the interviewer
/// persona and are sanitized before any prompt use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Application {
    /// Opaque application ID.
    pub id: String,
    /// Owning user ID.
    pub owner_id: String,
    /// Company the user applied to.
    pub company_name: String,
    /// Advertised job title.
    pub job_title: String,
    /// Full vacancy text, if captured.
    pub vacancy_text: Option<String>,
    /// Snapshot of the CV the user applied with.
    pub cv_snapshot: Option<String>,
    /// Narrative company-culture summary.
    pub culture_summary: Option<String>,
    /// Recent company news digest.
    pub recent_news: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

/// One coaching run against an application.
///
/// `phase` and `question_count` are mutated exclusively by the session
/// engine; `overall_score` and `feedback_summary` belong to the surrounding
/// product's analytics and are never written here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InterviewSession {
    /// Opaque session ID.
    pub id: String,
    /// Application this run trains for.
    pub application_id: String,
    /// Owning user ID.
    pub owner_id: String,
    /// Current conversational phase (TEXT form).
    pub phase: String,
    /// Questions asked so far.
    pub question_count: i64,
    /// When the run started (RFC 3339).
    pub started_at: String,
    /// Set exactly when the run reaches COMPLETED.
    pub completed_at: Option<String>,
    /// Post-run score, written by the surrounding product.
    pub overall_score: Option<f64>,
    /// Post-run feedback digest, written by the surrounding product.
    pub feedback_summary: Option<String>,
}

/// An immutable transcript entry. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InterviewMessage {
    /// Auto-incrementing ID; tiebreaker for same-timestamp ordering.
    pub id: i64,
    /// Session this entry belongs to.
    pub session_id: String,
    /// "assistant", "user", or "system".
    pub role: String,
    /// Message text (sanitized before storage for user turns).
    pub content: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}
