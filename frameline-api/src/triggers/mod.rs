//! Background trigger workers
//!
//! Long-lived tasks subscribed to the store change feed, standing in for the
//! platform-invoked background functions of the original deployment. A
//! worker that fails on one event logs and moves on; delivery is
//! at-least-once, so both handlers tolerate duplicate events.

pub mod comment_created;
pub mod project_updated;

use crate::AppContext;
use frameline_common::events::ChangeEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Spawn the comment fan-out worker and the status-change observer
pub fn spawn(ctx: &AppContext) -> Vec<JoinHandle<()>> {
    vec![spawn_fanout_worker(ctx), spawn_status_observer(ctx)]
}

fn spawn_fanout_worker(ctx: &AppContext) -> JoinHandle<()> {
    let db = ctx.db.clone();
    let mut rx = ctx.bus.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ChangeEvent::CommentCreated {
                    project_id,
                    revision_id,
                    comment_id,
                    author_id,
                    ..
                }) => {
                    if let Err(e) = comment_created::fan_out(
                        &db, project_id, revision_id, comment_id, author_id,
                    )
                    .await
                    {
                        error!("Comment fan-out failed for {}: {}", comment_id, e);
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Fan-out worker lagged, {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_status_observer(ctx: &AppContext) -> JoinHandle<()> {
    let mut rx = ctx.bus.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ChangeEvent::ProjectUpdated {
                    project_id,
                    old_status,
                    new_status,
                    ..
                }) => {
                    project_updated::observe_transition(project_id, old_status, new_status);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Status observer lagged, {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
