//! User profile access
//!
//! The `users` table mirrors the identity directory's accounts (the profile
//! side of the dual-write). Writes here do not touch the directory; the
//! provisioning flow and the reconciliation pass own that coupling.

use super::models::{Role, User};
use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

type UserRow = (String, String, String, Option<String>, String, String);

fn from_row(row: UserRow) -> Result<User> {
    Ok(User {
        uid: super::parse_uuid(&row.0)?,
        email: row.1,
        display_name: row.2,
        phone: row.3,
        role: Role::from_str(&row.4)?,
        created_at: super::parse_ts(&row.5)?,
    })
}

/// Insert a profile row. A duplicate email surfaces as [`Error::Conflict`].
pub async fn create_user(db: &Pool<Sqlite>, user: &User) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (uid, email, display_name, phone, role, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.uid.to_string())
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(&user.phone)
    .bind(user.role.as_str())
    .bind(user.created_at.to_rfc3339())
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(format!(
            "user with email {} already exists",
            user.email
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_user(db: &Pool<Sqlite>, uid: Uuid) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT uid, email, display_name, phone, role, created_at FROM users WHERE uid = ?",
    )
    .bind(uid.to_string())
    .fetch_optional(db)
    .await?;

    row.map(from_row).transpose()
}

pub async fn get_user_by_email(db: &Pool<Sqlite>, email: &str) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT uid, email, display_name, phone, role, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    row.map(from_row).transpose()
}

pub async fn list_users(db: &Pool<Sqlite>) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT uid, email, display_name, phone, role, created_at FROM users ORDER BY created_at",
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(from_row).collect()
}

/// Rewrite a user's role on the profile side only
pub async fn update_role(db: &Pool<Sqlite>, uid: Uuid, role: Role) -> Result<()> {
    let result = sqlx::query("UPDATE users SET role = ? WHERE uid = ?")
        .bind(role.as_str())
        .bind(uid.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", uid)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_test_database;
    use chrono::Utc;

    fn sample_user(email: &str, role: Role) -> User {
        User {
            uid: Uuid::new_v4(),
            email: email.to_string(),
            display_name: "Test User".to_string(),
            phone: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let db = init_test_database().await.unwrap();
        let user = sample_user("editor@example.com", Role::Editor);
        create_user(&db, &user).await.unwrap();

        let fetched = get_user(&db, user.uid).await.unwrap().unwrap();
        assert_eq!(fetched.email, "editor@example.com");
        assert_eq!(fetched.role, Role::Editor);

        let by_email = get_user_by_email(&db, "editor@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.uid, user.uid);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let db = init_test_database().await.unwrap();
        create_user(&db, &sample_user("dup@example.com", Role::Client))
            .await
            .unwrap();

        let err = create_user(&db, &sample_user("dup@example.com", Role::Client))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn update_role_rewrites_profile() {
        let db = init_test_database().await.unwrap();
        let user = sample_user("pm@example.com", Role::Editor);
        create_user(&db, &user).await.unwrap();

        update_role(&db, user.uid, Role::ProjectManager).await.unwrap();
        let fetched = get_user(&db, user.uid).await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::ProjectManager);

        let missing = update_role(&db, Uuid::new_v4(), Role::Admin).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }
}
