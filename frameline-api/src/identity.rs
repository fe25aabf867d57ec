//! Identity directory client and role provisioning
//!
//! The identity provider is an external collaborator; this module talks to
//! it through a narrow client (`IdentityDirectory`, backed here by its own
//! `auth_accounts` table) and owns the dual-write that mirrors the role into
//! both the directory claim and the profile document. The two writes are not
//! transactional with each other: an account can exist without a profile if
//! a later step fails. [`reconcile_roles`] is the read-repair pass that
//! detects and corrects claim/profile drift after the fact.

use frameline_common::db::models::{Role, User};
use frameline_common::db::users;
use frameline_common::{Error, Result};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Account record as the directory reports it
#[derive(Debug, Clone)]
pub struct DirectoryAccount {
    pub uid: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role_claim: Option<Role>,
}

/// Client for the external identity directory
#[derive(Clone)]
pub struct IdentityDirectory {
    db: SqlitePool,
}

impl IdentityDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an account. Duplicate email surfaces as [`Error::Conflict`]
    /// so callers can show a specific message.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        phone: Option<&str>,
    ) -> Result<Uuid> {
        let uid = Uuid::new_v4();
        let result = sqlx::query(
            r#"
            INSERT INTO auth_accounts (uid, email, password_hash, display_name, phone, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uid.to_string())
        .bind(email)
        .bind(hash_password(password))
        .bind(display_name)
        .bind(phone)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(uid),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(
                format!("account with email {} already exists", email),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn lookup_by_email(&self, email: &str) -> Result<Option<DirectoryAccount>> {
        let row: Option<(String, String, String, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT uid, email, display_name, phone, role_claim \
                 FROM auth_accounts WHERE email = ?",
            )
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        row.map(|(uid, email, display_name, phone, role_claim)| {
            Ok(DirectoryAccount {
                uid: Uuid::parse_str(&uid)
                    .map_err(|e| Error::Internal(format!("invalid uid in directory: {}", e)))?,
                email,
                display_name,
                phone,
                role_claim: role_claim.as_deref().map(|r| r.parse::<Role>()).transpose()?,
            })
        })
        .transpose()
    }

    /// Attach (overwrite) the role custom claim
    pub async fn set_role_claim(&self, uid: Uuid, role: Role) -> Result<()> {
        let result = sqlx::query("UPDATE auth_accounts SET role_claim = ? WHERE uid = ?")
            .bind(role.as_str())
            .bind(uid.to_string())
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("account {}", uid)));
        }
        Ok(())
    }

    pub async fn get_role_claim(&self, uid: Uuid) -> Result<Option<Role>> {
        let claim: Option<Option<String>> =
            sqlx::query_scalar("SELECT role_claim FROM auth_accounts WHERE uid = ?")
                .bind(uid.to_string())
                .fetch_optional(&self.db)
                .await?;

        match claim {
            None => Err(Error::NotFound(format!("account {}", uid))),
            Some(role) => role.as_deref().map(|r| r.parse::<Role>()).transpose(),
        }
    }
}

/// Create an account plus a mirrored profile plus a role claim.
///
/// Three writes with no rollback: if the profile write fails the account
/// still exists, and if the claim write fails the account and profile both
/// exist with no claim. Callers get the underlying error; the reconciliation
/// pass and conflict-aware retries are the mitigation, not compensation.
pub async fn provision_user(
    directory: &IdentityDirectory,
    db: &SqlitePool,
    email: &str,
    password: &str,
    display_name: &str,
    phone: Option<&str>,
    role: Role,
) -> Result<Uuid> {
    let uid = directory
        .create_account(email, password, display_name, phone)
        .await?;

    let user = User {
        uid,
        email: email.to_string(),
        display_name: display_name.to_string(),
        phone: phone.map(str::to_string),
        role,
        created_at: chrono::Utc::now(),
    };
    users::create_user(db, &user).await?;

    directory.set_role_claim(uid, role).await?;

    info!("Provisioned {} account for {}", role, email);
    Ok(uid)
}

/// Read-repair pass over the dual-written role state.
///
/// The profile document is authoritative: any account whose claim differs
/// from (or is missing against) the profile role gets its claim rewritten.
/// Returns the number of repaired accounts.
pub async fn reconcile_roles(directory: &IdentityDirectory, db: &SqlitePool) -> Result<u32> {
    let mut repaired = 0;

    for user in users::list_users(db).await? {
        let claim = match directory.get_role_claim(user.uid).await {
            Ok(claim) => claim,
            Err(Error::NotFound(_)) => {
                // Profile without any directory account: a partial provision
                // failed before the account write, or the account was removed
                // out of band. Nothing to repair from this side.
                warn!("Profile {} has no directory account", user.email);
                continue;
            }
            Err(e) => return Err(e),
        };

        if claim != Some(user.role) {
            directory.set_role_claim(user.uid, user.role).await?;
            info!(
                "Repaired role claim: {} {:?} -> {}",
                user.email, claim, user.role
            );
            repaired += 1;
        }
    }

    Ok(repaired)
}

/// Salted SHA-256 password hash, stored as `salt$digest` hex
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    format!("{}${}", hex::encode(salt), hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameline_common::db::init::init_test_database;

    #[tokio::test]
    async fn provision_writes_account_profile_and_claim() {
        let db = init_test_database().await.unwrap();
        let directory = IdentityDirectory::new(db.clone());

        let uid = provision_user(
            &directory,
            &db,
            "editor@studio.example",
            "s3cret",
            "Edit Or",
            Some("+91-900000000"),
            Role::Editor,
        )
        .await
        .unwrap();

        let account = directory
            .lookup_by_email("editor@studio.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.uid, uid);
        assert_eq!(account.role_claim, Some(Role::Editor));

        let profile = users::get_user(&db, uid).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Editor);
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_conflict() {
        let db = init_test_database().await.unwrap();
        let directory = IdentityDirectory::new(db.clone());

        provision_user(&directory, &db, "a@b.c", "pw", "A", None, Role::Client)
            .await
            .unwrap();
        let err = provision_user(&directory, &db, "a@b.c", "pw", "A", None, Role::Client)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn reconcile_repairs_drifted_claim() {
        let db = init_test_database().await.unwrap();
        let directory = IdentityDirectory::new(db.clone());

        let uid = provision_user(&directory, &db, "pm@b.c", "pw", "PM", None, Role::ProjectManager)
            .await
            .unwrap();

        // Seed drift: the claim says editor while the profile says PM
        directory.set_role_claim(uid, Role::Editor).await.unwrap();

        let repaired = reconcile_roles(&directory, &db).await.unwrap();
        assert_eq!(repaired, 1);
        assert_eq!(
            directory.get_role_claim(uid).await.unwrap(),
            Some(Role::ProjectManager)
        );

        // Second pass finds nothing to do
        assert_eq!(reconcile_roles(&directory, &db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn password_hashes_are_salted() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");
        assert_ne!(a, b);
        assert!(a.contains('$'));
    }
}
