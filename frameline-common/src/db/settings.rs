//! Settings access (key-value store)
//!
//! All settings are global, including the branding fields and the default
//! admin seed values.

use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Generic setting getter
///
/// Returns None if key doesn't exist in database.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

/// Email address used to seed the default admin account
pub async fn default_admin_email(db: &Pool<Sqlite>) -> Result<String> {
    match get_setting::<String>(db, "default_admin_email").await? {
        Some(email) => Ok(email),
        None => {
            let default = "admin@frameline.local".to_string();
            set_setting(db, "default_admin_email", default.clone()).await?;
            Ok(default)
        }
    }
}

/// Display name used to seed the default admin account
pub async fn default_admin_name(db: &Pool<Sqlite>) -> Result<String> {
    match get_setting::<String>(db, "default_admin_name").await? {
        Some(name) => Ok(name),
        None => {
            let default = "Frameline Admin".to_string();
            set_setting(db, "default_admin_name", default.clone()).await?;
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_test_database;

    #[tokio::test]
    async fn generic_get_set_roundtrip() {
        let db = init_test_database().await.unwrap();

        set_setting(&db, "test_int", 42).await.unwrap();
        let value: Option<i32> = get_setting(&db, "test_int").await.unwrap();
        assert_eq!(value, Some(42));

        set_setting(&db, "test_int", 7).await.unwrap();
        let value: Option<i32> = get_setting(&db, "test_int").await.unwrap();
        assert_eq!(value, Some(7));

        let missing: Option<String> = get_setting(&db, "nonexistent").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn default_admin_seed_initializes_once() {
        let db = init_test_database().await.unwrap();

        let email = default_admin_email(&db).await.unwrap();
        assert_eq!(email, "admin@frameline.local");

        set_setting(&db, "default_admin_email", "boss@studio.example").await.unwrap();
        let email = default_admin_email(&db).await.unwrap();
        assert_eq!(email, "boss@studio.example");
    }
}
