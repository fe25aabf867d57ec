//! Guest reviewer identity capture
//!
//! Unauthenticated reviewers are gated behind a minimal name-capture step
//! before they may comment. Validation happens here; persistence of the
//! resulting guest session is the caller's job.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A validated guest identity, ready to be persisted as a guest session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestIdentity {
    pub name: String,
    pub email: Option<String>,
}

impl GuestIdentity {
    /// Trim and validate a guest capture.
    ///
    /// The name is required and must be non-empty after trimming; the email
    /// is optional and kept only if non-empty after trimming. No uniqueness
    /// or duplicate-session check happens here: a returning guest simply
    /// gets a fresh session.
    pub fn parse(name: &str, email: Option<&str>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("guest name is required".to_string()));
        }
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        Ok(GuestIdentity {
            name: name.to_string(),
            email,
        })
    }
}
