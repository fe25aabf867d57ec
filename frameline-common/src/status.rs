//! Project status state machine
//!
//! Status used to be a bare string field mutated directly by call sites,
//! which left nothing to stop a completed project from flipping back to
//! active. The allowed transitions now live in one table and every status
//! write goes through [`ProjectStatus::transition`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    PendingAssignment,
    Active,
    InReview,
    Approved,
    Completed,
    Archived,
}

impl ProjectStatus {
    /// All statuses, for validation and enumeration
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::PendingAssignment,
        ProjectStatus::Active,
        ProjectStatus::InReview,
        ProjectStatus::Approved,
        ProjectStatus::Completed,
        ProjectStatus::Archived,
    ];

    /// Allowed transition table. Self-transitions are not listed; a no-op
    /// update is not a transition and must not fire status hooks.
    pub fn can_transition(self, to: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, to),
            (PendingAssignment, Active)
                | (Active, InReview)
                | (Active, Archived)
                | (InReview, Active)
                | (InReview, Approved)
                | (Approved, InReview)
                | (Approved, Completed)
                | (Completed, Archived)
        )
    }

    /// Validate and perform a transition, rejecting disallowed pairs
    /// centrally instead of at each call site.
    pub fn transition(self, to: ProjectStatus) -> Result<ProjectStatus> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(Error::InvalidTransition(format!("{} -> {}", self, to)))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::PendingAssignment => "pending_assignment",
            ProjectStatus::Active => "active",
            ProjectStatus::InReview => "in_review",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending_assignment" => Ok(ProjectStatus::PendingAssignment),
            "active" => Ok(ProjectStatus::Active),
            "in_review" => Ok(ProjectStatus::InReview),
            "approved" => Ok(ProjectStatus::Approved),
            "completed" => Ok(ProjectStatus::Completed),
            "archived" => Ok(ProjectStatus::Archived),
            other => Err(Error::InvalidInput(format!(
                "unknown project status: {}",
                other
            ))),
        }
    }
}

/// Payment progress of a project, independent of workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partially_paid" => Ok(PaymentStatus::PartiallyPaid),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(Error::InvalidInput(format!(
                "unknown payment status: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_cannot_reactivate() {
        assert!(!ProjectStatus::Completed.can_transition(ProjectStatus::Active));
        assert!(ProjectStatus::Completed
            .transition(ProjectStatus::Active)
            .is_err());
    }

    #[test]
    fn review_cycle_is_allowed() {
        let s = ProjectStatus::Active;
        let s = s.transition(ProjectStatus::InReview).unwrap();
        let s = s.transition(ProjectStatus::Approved).unwrap();
        // A rejected approval goes back to review
        let s = s.transition(ProjectStatus::InReview).unwrap();
        let s = s.transition(ProjectStatus::Approved).unwrap();
        let s = s.transition(ProjectStatus::Completed).unwrap();
        assert_eq!(s, ProjectStatus::Completed);
    }

    #[test]
    fn self_transition_is_not_allowed() {
        for s in ProjectStatus::ALL {
            assert!(!s.can_transition(s), "{} -> {} should be a no-op", s, s);
        }
    }

    #[test]
    fn round_trips_through_strings() {
        for s in ProjectStatus::ALL {
            assert_eq!(s.as_str().parse::<ProjectStatus>().unwrap(), s);
        }
        assert!("bogus".parse::<ProjectStatus>().is_err());
    }
}
