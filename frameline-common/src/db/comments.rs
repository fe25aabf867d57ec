//! Timeline comment access

use super::models::{Comment, CommentReply, CommentStatus};
use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

type CommentRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    f64,
    String,
    String,
    String,
);

fn from_row(row: CommentRow) -> Result<Comment> {
    Ok(Comment {
        id: super::parse_uuid(&row.0)?,
        project_id: super::parse_uuid(&row.1)?,
        revision_id: super::parse_uuid(&row.2)?,
        author_id: row.3.as_deref().map(super::parse_uuid).transpose()?,
        author_name: row.4,
        timestamp_secs: row.5,
        body: row.6,
        status: CommentStatus::from_str(&row.7)?,
        created_at: super::parse_ts(&row.8)?,
    })
}

const SELECT_COLS: &str = "id, project_id, revision_id, author_id, author_name, \
                           timestamp_secs, body, status, created_at";

pub async fn create_comment(db: &Pool<Sqlite>, comment: &Comment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO comments
            (id, project_id, revision_id, author_id, author_name,
             timestamp_secs, body, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(comment.id.to_string())
    .bind(comment.project_id.to_string())
    .bind(comment.revision_id.to_string())
    .bind(comment.author_id.map(|id| id.to_string()))
    .bind(&comment.author_name)
    .bind(comment.timestamp_secs)
    .bind(&comment.body)
    .bind(comment.status.as_str())
    .bind(comment.created_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_comment(db: &Pool<Sqlite>, id: Uuid) -> Result<Option<Comment>> {
    let row: Option<CommentRow> =
        sqlx::query_as(&format!("SELECT {} FROM comments WHERE id = ?", SELECT_COLS))
            .bind(id.to_string())
            .fetch_optional(db)
            .await?;

    row.map(from_row).transpose()
}

/// Comments for one revision, ordered by playback offset
pub async fn list_for_revision(db: &Pool<Sqlite>, revision_id: Uuid) -> Result<Vec<Comment>> {
    let rows: Vec<CommentRow> = sqlx::query_as(&format!(
        "SELECT {} FROM comments WHERE revision_id = ? ORDER BY timestamp_secs",
        SELECT_COLS
    ))
    .bind(revision_id.to_string())
    .fetch_all(db)
    .await?;

    rows.into_iter().map(from_row).collect()
}

/// Toggle open/resolved. Status lives entirely on the comment document.
pub async fn set_status(db: &Pool<Sqlite>, id: Uuid, status: CommentStatus) -> Result<()> {
    let result = sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("comment {}", id)));
    }
    Ok(())
}

pub async fn add_reply(db: &Pool<Sqlite>, reply: &CommentReply) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO comment_replies (id, comment_id, author_id, author_name, body, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(reply.id.to_string())
    .bind(reply.comment_id.to_string())
    .bind(reply.author_id.map(|id| id.to_string()))
    .bind(&reply.author_name)
    .bind(&reply.body)
    .bind(reply.created_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn list_replies(db: &Pool<Sqlite>, comment_id: Uuid) -> Result<Vec<CommentReply>> {
    let rows: Vec<(String, String, Option<String>, String, String, String)> = sqlx::query_as(
        "SELECT id, comment_id, author_id, author_name, body, created_at \
         FROM comment_replies WHERE comment_id = ? ORDER BY created_at",
    )
    .bind(comment_id.to_string())
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(CommentReply {
                id: super::parse_uuid(&row.0)?,
                comment_id: super::parse_uuid(&row.1)?,
                author_id: row.2.as_deref().map(super::parse_uuid).transpose()?,
                author_name: row.3,
                body: row.4,
                created_at: super::parse_ts(&row.5)?,
            })
        })
        .collect()
}
