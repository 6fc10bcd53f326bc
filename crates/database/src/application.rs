//! Application CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Application;

/// Create a new application.
pub async fn create_application(pool: &SqlitePool, application: &Application) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO applications
            (id, owner_id, company_name, job_title, vacancy_text, cv_snapshot,
             culture_summary, recent_news, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&application.id)
    .bind(&application.owner_id)
    .bind(&application.company_name)
    .bind(&application.job_title)
    .bind(&application.vacancy_text)
    .bind(&application.cv_snapshot)
    .bind(&application.culture_summary)
    .bind(&application.recent_news)
    .bind(&application.created_at)
    .bind(&application.updated_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Application",
                    id: application.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get an application by ID.
pub async fn get_application(pool: &SqlitePool, id: &str) -> Result<Application> {
    sqlx::query_as::<_, Application>(
        r#"
        SELECT id, owner_id, company_name, job_title, vacancy_text, cv_snapshot,
               culture_summary, recent_news, created_at, updated_at
        FROM applications
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Application",
        id: id.to_string(),
    })
}

/// List all applications belonging to an owner, newest first.
pub async fn list_applications_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
) -> Result<Vec<Application>> {
    let applications = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, owner_id, company_name, job_title, vacancy_text, cv_snapshot,
               culture_summary, recent_news, created_at, updated_at
        FROM applications
        WHERE owner_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(applications)
}
