//! Database models

use crate::status::{PaymentStatus, ProjectStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User role. Exactly one role per user; the role string is the sole
/// authorization signal everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Editor,
    Client,
    Guest,
    SalesExecutive,
    ProjectManager,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Manager,
        Role::Editor,
        Role::Client,
        Role::Guest,
        Role::SalesExecutive,
        Role::ProjectManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Editor => "editor",
            Role::Client => "client",
            Role::Guest => "guest",
            Role::SalesExecutive => "sales_executive",
            Role::ProjectManager => "project_manager",
        }
    }

    /// Roles that admin provisioning may create
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::Manager | Role::Editor | Role::SalesExecutive | Role::ProjectManager
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "editor" => Ok(Role::Editor),
            "client" => Ok(Role::Client),
            "guest" => Ok(Role::Guest),
            "sales_executive" => Ok(Role::SalesExecutive),
            "project_manager" => Ok(Role::ProjectManager),
            other => Err(Error::InvalidInput(format!("invalid role: {}", other))),
        }
    }
}

/// Profile document mirrored from the identity directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub uid: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub status: ProjectStatus,
    pub payment_status: PaymentStatus,
    pub total_cost: f64,
    pub amount_paid: f64,
    pub current_revision_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One uploaded version of a project's video. Immutable once created;
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub id: Uuid,
    pub project_id: Uuid,
    pub version: i64,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Open,
    Resolved,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Open => "open",
            CommentStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(CommentStatus::Open),
            "resolved" => Ok(CommentStatus::Resolved),
            other => Err(Error::InvalidInput(format!(
                "invalid comment status: {}",
                other
            ))),
        }
    }
}

/// Review comment anchored to a (project, revision, timestamp) triple.
/// The timestamp is a playback offset in seconds, not wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub revision_id: Uuid,
    /// None for guest comments; attribution then lives in `author_name`
    pub author_id: Option<Uuid>,
    pub author_name: String,
    pub timestamp_secs: f64,
    pub body: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReply {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Fire-and-forget notification addressed to one user. Created only by the
/// trigger workers; only `read` is ever updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub body: String,
    pub link: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Unauthenticated-reviewer identity, one per capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSession {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
