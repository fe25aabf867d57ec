//! frameline-api library - review/payments service
//!
//! Exposes the application context and router builder so integration tests
//! can drive the HTTP surface without binding a socket.

use frameline_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod api;
pub mod identity;
pub mod payments;
pub mod triggers;

use identity::IdentityDirectory;
use payments::OrderGateway;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppContext {
    /// Document store connection pool
    pub db: SqlitePool,
    /// Change-feed bus; handlers emit, trigger workers consume
    pub bus: EventBus,
    /// Identity directory client (account creation, role claims)
    pub directory: IdentityDirectory,
    /// Payment gateway order-creation client
    pub gateway: Arc<dyn OrderGateway>,
    /// Shared secret for payment-callback signature verification
    pub gateway_secret: String,
}

impl AppContext {
    pub fn new(
        db: SqlitePool,
        bus: EventBus,
        gateway: Arc<dyn OrderGateway>,
        gateway_secret: String,
    ) -> Self {
        let directory = IdentityDirectory::new(db.clone());
        Self {
            db,
            bus,
            directory,
            gateway,
            gateway_secret,
        }
    }
}

pub use api::server::build_router;
