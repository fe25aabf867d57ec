//! Revision access
//!
//! Revisions are immutable once created and never deleted; there is no
//! update or delete query here on purpose.

use super::models::Revision;
use crate::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

type RevisionRow = (String, String, i64, String, Option<String>, f64, String);

fn from_row(row: RevisionRow) -> Result<Revision> {
    Ok(Revision {
        id: super::parse_uuid(&row.0)?,
        project_id: super::parse_uuid(&row.1)?,
        version: row.2,
        video_url: row.3,
        thumbnail_url: row.4,
        duration_secs: row.5,
        created_at: super::parse_ts(&row.6)?,
    })
}

pub async fn create_revision(db: &Pool<Sqlite>, revision: &Revision) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO revisions
            (id, project_id, version, video_url, thumbnail_url, duration_secs, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(revision.id.to_string())
    .bind(revision.project_id.to_string())
    .bind(revision.version)
    .bind(&revision.video_url)
    .bind(&revision.thumbnail_url)
    .bind(revision.duration_secs)
    .bind(revision.created_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_revision(db: &Pool<Sqlite>, id: Uuid) -> Result<Option<Revision>> {
    let row: Option<RevisionRow> = sqlx::query_as(
        "SELECT id, project_id, version, video_url, thumbnail_url, duration_secs, created_at \
         FROM revisions WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;

    row.map(from_row).transpose()
}

/// Next version number for a project's upload (1-based)
pub async fn next_version(db: &Pool<Sqlite>, project_id: Uuid) -> Result<i64> {
    let max: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM revisions WHERE project_id = ?")
            .bind(project_id.to_string())
            .fetch_one(db)
            .await?;

    Ok(max.unwrap_or(0) + 1)
}
