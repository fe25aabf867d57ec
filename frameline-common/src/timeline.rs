//! Timeline comment marker math
//!
//! Maps review comments onto a horizontal playback track and back. All
//! functions here are pure; the HTTP layer and any front end consume the
//! fractional positions and issue seeks through their own callbacks, so data
//! flows one way only (comments -> markers -> seek target).

use crate::db::models::{Comment, CommentStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual state of a timeline marker, derived from the comment status.
///
/// Never stored; recomputed from the comment on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    Open,
    Resolved,
}

/// One renderable marker on the review track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub comment_id: Uuid,
    /// Playback offset of the anchored comment, in seconds
    pub timestamp_secs: f64,
    /// Fractional position along the track, in [0, 1]
    pub fraction: f64,
    pub state: MarkerState,
}

/// Fractional track position for a comment at `timestamp_secs` of a revision
/// lasting `duration_secs`.
///
/// Returns `None` when the duration is zero, negative, or not a number: with
/// no usable duration there is nothing to render and no division happens.
/// Timestamps outside [0, duration] are clamped into range.
pub fn marker_fraction(timestamp_secs: f64, duration_secs: f64) -> Option<f64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return None;
    }
    let t = timestamp_secs.clamp(0.0, duration_secs);
    Some(t / duration_secs)
}

/// Playback offset (seconds) for a click at fractional track position
/// `fraction` on a revision lasting `duration_secs`.
///
/// The fraction is clamped to [0, 1] so an out-of-track click seeks to the
/// nearest edge rather than outside the revision.
pub fn seek_target(fraction: f64, duration_secs: f64) -> f64 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0.0;
    }
    fraction.clamp(0.0, 1.0) * duration_secs
}

/// Derive markers for every comment of the active revision.
///
/// Empty when the duration is unknown: the track renders nothing rather than
/// guessing positions.
pub fn markers(comments: &[Comment], duration_secs: f64) -> Vec<Marker> {
    comments
        .iter()
        .filter_map(|c| {
            marker_fraction(c.timestamp_secs, duration_secs).map(|fraction| Marker {
                comment_id: c.id,
                timestamp_secs: c.timestamp_secs,
                fraction,
                state: match c.status {
                    CommentStatus::Open => MarkerState::Open,
                    CommentStatus::Resolved => MarkerState::Resolved,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment_at(timestamp_secs: f64, status: CommentStatus) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            revision_id: Uuid::new_v4(),
            author_id: Some(Uuid::new_v4()),
            author_name: "Reviewer".to_string(),
            timestamp_secs,
            body: "note".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fraction_is_timestamp_over_duration() {
        assert_eq!(marker_fraction(30.0, 120.0), Some(0.25));
        assert_eq!(marker_fraction(0.0, 120.0), Some(0.0));
        assert_eq!(marker_fraction(120.0, 120.0), Some(1.0));
    }

    #[test]
    fn zero_duration_yields_no_marker() {
        assert_eq!(marker_fraction(10.0, 0.0), None);
        assert_eq!(marker_fraction(10.0, -5.0), None);
        assert_eq!(marker_fraction(10.0, f64::NAN), None);
    }

    #[test]
    fn out_of_range_timestamps_clamp() {
        assert_eq!(marker_fraction(-3.0, 60.0), Some(0.0));
        assert_eq!(marker_fraction(90.0, 60.0), Some(1.0));
    }

    #[test]
    fn seek_inverts_fraction() {
        assert_eq!(seek_target(0.25, 120.0), 30.0);
        assert_eq!(seek_target(0.0, 120.0), 0.0);
        assert_eq!(seek_target(1.0, 120.0), 120.0);
        // Clicks off the ends of the track clamp to the edges
        assert_eq!(seek_target(1.5, 120.0), 120.0);
        assert_eq!(seek_target(-0.5, 120.0), 0.0);
    }

    #[test]
    fn seek_with_unknown_duration_goes_nowhere() {
        assert_eq!(seek_target(0.5, 0.0), 0.0);
    }

    #[test]
    fn markers_derive_state_from_comment_status() {
        let comments = vec![
            comment_at(10.0, CommentStatus::Open),
            comment_at(60.0, CommentStatus::Resolved),
        ];
        let ms = markers(&comments, 120.0);
        assert_eq!(ms.len(), 2);
        assert_eq!(ms[0].state, MarkerState::Open);
        assert!((ms[0].fraction - 10.0 / 120.0).abs() < 1e-12);
        assert_eq!(ms[1].state, MarkerState::Resolved);
        assert_eq!(ms[1].fraction, 0.5);
    }

    #[test]
    fn markers_empty_for_zero_duration() {
        let comments = vec![comment_at(10.0, CommentStatus::Open)];
        assert!(markers(&comments, 0.0).is_empty());
    }
}
