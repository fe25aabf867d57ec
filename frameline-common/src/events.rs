//! Change-feed events for the Frameline store
//!
//! The original platform delivered document create/update events to managed
//! background functions. Here the same contract is modeled as a broadcast
//! channel: writers emit a [`ChangeEvent`] after committing a document, and
//! trigger workers consume a subscription. Delivery is at-least-once from a
//! worker's point of view (a retried caller may re-emit), so handlers must
//! tolerate duplicates.

use crate::status::ProjectStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Store change events, keyed by the document that changed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    /// A review comment document was created
    ///
    /// Triggers:
    /// - Notification fan-out to project members other than the author
    CommentCreated {
        project_id: Uuid,
        revision_id: Uuid,
        comment_id: Uuid,
        /// None when the comment was left by a guest session
        author_id: Option<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A project document was updated with a status change
    ///
    /// Only emitted when the status actually transitioned; a write that
    /// leaves the status unchanged produces no event.
    ///
    /// Triggers:
    /// - Status-change observer (transition log + per-transition hooks)
    ProjectUpdated {
        project_id: Uuid,
        old_status: ProjectStatus,
        new_status: ProjectStatus,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new revision was uploaded and became the project's current revision
    RevisionUploaded {
        project_id: Uuid,
        revision_id: Uuid,
        version: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A verified payment was credited to a project
    PaymentCaptured {
        project_id: Uuid,
        order_id: String,
        amount: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus for store change events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block writers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ChangeEvent,
    ) -> Result<usize, broadcast::error::SendError<ChangeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used by request handlers: a comment create must succeed even when no
    /// trigger worker happens to be running.
    pub fn emit_lossy(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let project_id = Uuid::new_v4();
        bus.emit(ChangeEvent::ProjectUpdated {
            project_id,
            old_status: ProjectStatus::Active,
            new_status: ProjectStatus::InReview,
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

        match rx.recv().await.unwrap() {
            ChangeEvent::ProjectUpdated {
                project_id: p,
                old_status,
                new_status,
                ..
            } => {
                assert_eq!(p, project_id);
                assert_eq!(old_status, ProjectStatus::Active);
                assert_eq!(new_status, ProjectStatus::InReview);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn emit_lossy_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        bus.emit_lossy(ChangeEvent::CommentCreated {
            project_id: Uuid::new_v4(),
            revision_id: Uuid::new_v4(),
            comment_id: Uuid::new_v4(),
            author_id: None,
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
