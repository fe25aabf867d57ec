//! HTTP server setup and routing
//!
//! All privileged operations are POST; reads are GET. Every handler returns
//! either `{success, ...}` with a 2xx status or `{error}` with a matching
//! 4xx/5xx status.

use crate::AppContext;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build application router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::users::health))

        // Privileged provisioning
        .route("/admin/users", post(super::users::create_staff_user))
        .route("/sales/clients", post(super::users::create_sales_client))
        .route("/admin/ensure-default", post(super::users::ensure_default_admin))
        .route("/admin/reconcile-roles", post(super::users::reconcile_roles))

        // Payments
        .route("/payments/order", post(super::payments::create_order))
        .route("/payments/verify", post(super::payments::verify_payment))

        // Projects and revisions
        .route("/projects", post(super::projects::create_project))
        .route("/projects/:id/members", post(super::projects::add_member))
        .route("/projects/:id/revisions", post(super::projects::upload_revision))
        .route(
            "/projects/:id/revisions/:rev/markers",
            get(super::projects::get_markers),
        )

        // Review workflow
        .route("/review/guest-session", post(super::review::create_guest_session))
        .route("/projects/:id/comments", post(super::review::create_comment))
        .route(
            "/projects/:id/revisions/:rev/comments",
            get(super::review::list_comments),
        )
        .route("/comments/:id/resolve", post(super::review::resolve_comment))
        .route("/comments/:id/reopen", post(super::review::reopen_comment))
        .route("/comments/:id/replies", post(super::review::add_reply))

        // Notifications
        .route("/users/:uid/notifications", get(super::review::list_notifications))
        .route("/notifications/:id/read", post(super::review::mark_notification_read))

        // Attach application context
        .with_state(ctx)

        // Request tracing plus permissive CORS for the review front end
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
