//! Integration tests for database initialization
//!
//! Covers first-run creation of the store file, idempotent re-init, and the
//! default settings seed.

use frameline_common::db::init::init_database;
use frameline_common::db::settings::get_setting;
use tempfile::TempDir;

#[tokio::test]
async fn creates_database_on_first_run() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("frameline.db");
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    // Schema is queryable immediately
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn reinit_is_idempotent_and_preserves_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("frameline.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO settings (key, value) VALUES ('probe', 'kept')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let value: Option<String> = get_setting(&pool, "probe").await.unwrap();
    assert_eq!(value, Some("kept".to_string()));
}

#[tokio::test]
async fn default_settings_are_seeded_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("frameline.db");

    let pool = init_database(&db_path).await.unwrap();
    let email: Option<String> = get_setting(&pool, "default_admin_email").await.unwrap();
    assert_eq!(email, Some("admin@frameline.local".to_string()));

    // Customize, then re-init: the seed must not clobber the custom value
    sqlx::query("UPDATE settings SET value = 'ops@studio.example' WHERE key = 'default_admin_email'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let email: Option<String> = get_setting(&pool, "default_admin_email").await.unwrap();
    assert_eq!(email, Some("ops@studio.example".to_string()));
}

#[tokio::test]
async fn creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("deeper").join("frameline.db");

    init_database(&db_path).await.unwrap();
    assert!(db_path.exists());
}
