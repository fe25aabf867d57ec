//! Project access
//!
//! Status writes go through [`update_status`] so the transition table is
//! enforced in one place. Payment crediting is a single UPDATE with an
//! increment expression, never an overwrite, so concurrent partial payments
//! sum correctly regardless of order.

use super::models::Project;
use crate::status::{PaymentStatus, ProjectStatus};
use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

type ProjectRow = (
    String,
    String,
    String,
    String,
    f64,
    f64,
    Option<String>,
    String,
    String,
);

fn from_row(row: ProjectRow) -> Result<Project> {
    Ok(Project {
        id: super::parse_uuid(&row.0)?,
        title: row.1,
        status: ProjectStatus::from_str(&row.2)?,
        payment_status: PaymentStatus::from_str(&row.3)?,
        total_cost: row.4,
        amount_paid: row.5,
        current_revision_id: row.6.as_deref().map(super::parse_uuid).transpose()?,
        created_at: super::parse_ts(&row.7)?,
        updated_at: super::parse_ts(&row.8)?,
    })
}

const SELECT_COLS: &str = "id, title, status, payment_status, total_cost, amount_paid, \
                           current_revision_id, created_at, updated_at";

pub async fn create_project(db: &Pool<Sqlite>, project: &Project) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO projects
            (id, title, status, payment_status, total_cost, amount_paid,
             current_revision_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(project.id.to_string())
    .bind(&project.title)
    .bind(project.status.as_str())
    .bind(project.payment_status.as_str())
    .bind(project.total_cost)
    .bind(project.amount_paid)
    .bind(project.current_revision_id.map(|id| id.to_string()))
    .bind(project.created_at.to_rfc3339())
    .bind(project.updated_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_project(db: &Pool<Sqlite>, id: Uuid) -> Result<Option<Project>> {
    let row: Option<ProjectRow> =
        sqlx::query_as(&format!("SELECT {} FROM projects WHERE id = ?", SELECT_COLS))
            .bind(id.to_string())
            .fetch_optional(db)
            .await?;

    row.map(from_row).transpose()
}

/// Transition a project's status through the central transition table.
///
/// Returns `(old, new)` on success so the caller can emit the change event.
/// A no-op write (`new == old`) returns `Ok(None)` and emits nothing.
pub async fn update_status(
    db: &Pool<Sqlite>,
    id: Uuid,
    new_status: ProjectStatus,
) -> Result<Option<(ProjectStatus, ProjectStatus)>> {
    let project = get_project(db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("project {}", id)))?;

    if project.status == new_status {
        return Ok(None);
    }

    let validated = project.status.transition(new_status)?;

    sqlx::query("UPDATE projects SET status = ?, updated_at = ? WHERE id = ?")
        .bind(validated.as_str())
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(Some((project.status, validated)))
}

/// Credit a verified payment: commutative increment plus payment-status
/// overwrite, in one atomic document-level UPDATE.
pub async fn credit_payment(
    db: &Pool<Sqlite>,
    id: Uuid,
    amount: f64,
    payment_status: PaymentStatus,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET amount_paid = amount_paid + ?,
            payment_status = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(amount)
    .bind(payment_status.as_str())
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(id.to_string())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("project {}", id)));
    }
    Ok(())
}

pub async fn set_current_revision(db: &Pool<Sqlite>, id: Uuid, revision_id: Uuid) -> Result<()> {
    let result =
        sqlx::query("UPDATE projects SET current_revision_id = ?, updated_at = ? WHERE id = ?")
            .bind(revision_id.to_string())
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("project {}", id)));
    }
    Ok(())
}

/// Add a user to the project's member set (idempotent)
pub async fn add_member(db: &Pool<Sqlite>, project_id: Uuid, user_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT INTO project_members (project_id, user_id) VALUES (?, ?) \
         ON CONFLICT(project_id, user_id) DO NOTHING",
    )
    .bind(project_id.to_string())
    .bind(user_id.to_string())
    .execute(db)
    .await?;

    Ok(())
}

/// Unordered member set, used for both access checks and fan-out targets
pub async fn get_members(db: &Pool<Sqlite>, project_id: Uuid) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT user_id FROM project_members WHERE project_id = ?")
            .bind(project_id.to_string())
            .fetch_all(db)
            .await?;

    rows.iter().map(|(id,)| super::parse_uuid(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_test_database;
    use chrono::Utc;

    pub(crate) fn sample_project(status: ProjectStatus) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Launch film".to_string(),
            status,
            payment_status: PaymentStatus::Unpaid,
            total_cost: 50_000.0,
            amount_paid: 0.0,
            current_revision_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn status_update_reports_transition() {
        let db = init_test_database().await.unwrap();
        let project = sample_project(ProjectStatus::Active);
        create_project(&db, &project).await.unwrap();

        let change = update_status(&db, project.id, ProjectStatus::InReview)
            .await
            .unwrap();
        assert_eq!(
            change,
            Some((ProjectStatus::Active, ProjectStatus::InReview))
        );

        let fetched = get_project(&db, project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::InReview);
    }

    #[tokio::test]
    async fn noop_status_update_returns_none() {
        let db = init_test_database().await.unwrap();
        let project = sample_project(ProjectStatus::Active);
        create_project(&db, &project).await.unwrap();

        let change = update_status(&db, project.id, ProjectStatus::Active)
            .await
            .unwrap();
        assert_eq!(change, None);
    }

    #[tokio::test]
    async fn invalid_transition_is_rejected() {
        let db = init_test_database().await.unwrap();
        let project = sample_project(ProjectStatus::Completed);
        create_project(&db, &project).await.unwrap();

        let err = update_status(&db, project.id, ProjectStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));

        // Nothing was written
        let fetched = get_project(&db, project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::Completed);
    }

    #[tokio::test]
    async fn crediting_is_commutative() {
        let db = init_test_database().await.unwrap();
        let a = sample_project(ProjectStatus::Active);
        let b = sample_project(ProjectStatus::Active);
        create_project(&db, &a).await.unwrap();
        create_project(&db, &b).await.unwrap();

        // A then B on one project, B then A on the other
        credit_payment(&db, a.id, 10_000.0, PaymentStatus::PartiallyPaid)
            .await
            .unwrap();
        credit_payment(&db, a.id, 40_000.0, PaymentStatus::Paid)
            .await
            .unwrap();

        credit_payment(&db, b.id, 40_000.0, PaymentStatus::PartiallyPaid)
            .await
            .unwrap();
        credit_payment(&db, b.id, 10_000.0, PaymentStatus::Paid)
            .await
            .unwrap();

        let a = get_project(&db, a.id).await.unwrap().unwrap();
        let b = get_project(&db, b.id).await.unwrap().unwrap();
        assert_eq!(a.amount_paid, 50_000.0);
        assert_eq!(b.amount_paid, 50_000.0);
    }

    #[tokio::test]
    async fn member_set_is_deduplicated() {
        let db = init_test_database().await.unwrap();
        let project = sample_project(ProjectStatus::Active);
        create_project(&db, &project).await.unwrap();

        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        add_member(&db, project.id, u1).await.unwrap();
        add_member(&db, project.id, u1).await.unwrap();
        add_member(&db, project.id, u2).await.unwrap();

        let members = get_members(&db, project.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&u1));
        assert!(members.contains(&u2));
    }
}
