//! Notification access
//!
//! Notifications are derived documents: the trigger workers create them,
//! readers list them, and the only mutation ever applied is marking one
//! read. Fan-out inserts go through [`create_batch`] so the whole batch
//! commits or none of it does.

use super::models::Notification;
use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

type NotificationRow = (String, String, String, String, String, i64, String);

fn from_row(row: NotificationRow) -> Result<Notification> {
    Ok(Notification {
        id: super::parse_uuid(&row.0)?,
        user_id: super::parse_uuid(&row.1)?,
        kind: row.2,
        body: row.3,
        link: row.4,
        read: row.5 != 0,
        created_at: super::parse_ts(&row.6)?,
    })
}

/// Insert a batch of notifications in one transaction (all-or-nothing).
///
/// Decouples "who gets notified" from "did each individual write succeed":
/// either every recipient's document exists afterwards or none does.
pub async fn create_batch(db: &Pool<Sqlite>, notifications: &[Notification]) -> Result<()> {
    if notifications.is_empty() {
        return Ok(());
    }

    let mut tx = db.begin().await?;
    for n in notifications {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, body, link, read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(n.id.to_string())
        .bind(n.user_id.to_string())
        .bind(&n.kind)
        .bind(&n.body)
        .bind(&n.link)
        .bind(n.read as i64)
        .bind(n.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(())
}

/// Notifications addressed to one user, newest first
pub async fn list_for_user(db: &Pool<Sqlite>, user_id: Uuid) -> Result<Vec<Notification>> {
    let rows: Vec<NotificationRow> = sqlx::query_as(
        "SELECT id, user_id, kind, body, link, read, created_at \
         FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(db)
    .await?;

    rows.into_iter().map(from_row).collect()
}

pub async fn mark_read(db: &Pool<Sqlite>, id: Uuid) -> Result<()> {
    let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("notification {}", id)));
    }
    Ok(())
}
