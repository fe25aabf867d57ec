//! Database models and queries

pub mod comments;
pub mod guests;
pub mod init;
pub mod models;
pub mod notifications;
pub mod projects;
pub mod revisions;
pub mod settings;
pub mod users;

pub use init::*;
pub use models::*;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Parse a TEXT uuid column
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("invalid uuid in store: {}", e)))
}

/// Parse a TEXT timestamp column (RFC3339, as written by this crate)
pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("invalid timestamp in store: {}", e)))
}
