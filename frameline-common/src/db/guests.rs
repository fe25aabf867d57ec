//! Guest session access
//!
//! No uniqueness or duplicate-session checks: a returning guest gets a new
//! session per capture, matching the capture flow's contract.

use super::models::GuestSession;
use crate::review::GuestIdentity;
use crate::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Persist a validated guest capture as a fresh session
pub async fn create_session(db: &Pool<Sqlite>, identity: &GuestIdentity) -> Result<GuestSession> {
    let session = GuestSession {
        id: Uuid::new_v4(),
        name: identity.name.clone(),
        email: identity.email.clone(),
        created_at: chrono::Utc::now(),
    };

    sqlx::query("INSERT INTO guest_sessions (id, name, email, created_at) VALUES (?, ?, ?, ?)")
        .bind(session.id.to_string())
        .bind(&session.name)
        .bind(&session.email)
        .bind(session.created_at.to_rfc3339())
        .execute(db)
        .await?;

    Ok(session)
}

pub async fn get_session(db: &Pool<Sqlite>, id: Uuid) -> Result<Option<GuestSession>> {
    let row: Option<(String, String, Option<String>, String)> =
        sqlx::query_as("SELECT id, name, email, created_at FROM guest_sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(db)
            .await?;

    row.map(|(id, name, email, created_at)| {
        Ok(GuestSession {
            id: super::parse_uuid(&id)?,
            name,
            email,
            created_at: super::parse_ts(&created_at)?,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_test_database;

    #[tokio::test]
    async fn repeated_captures_create_distinct_sessions() {
        let db = init_test_database().await.unwrap();
        let identity = GuestIdentity::parse("Ravi", Some("ravi@example.com")).unwrap();

        let a = create_session(&db, &identity).await.unwrap();
        let b = create_session(&db, &identity).await.unwrap();
        assert_ne!(a.id, b.id);

        let fetched = get_session(&db, a.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ravi");
        assert_eq!(fetched.email.as_deref(), Some("ravi@example.com"));
    }
}
