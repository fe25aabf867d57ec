//! Review workflow handlers: guest capture, timeline comments, notifications

use super::{bad_request, error_response, ApiError};
use crate::AppContext;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use frameline_common::db::models::{Comment, CommentReply, CommentStatus, Notification};
use frameline_common::db::{comments, guests, notifications, projects, revisions, users};
use frameline_common::events::ChangeEvent;
use frameline_common::review::GuestIdentity;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GuestSessionRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuestSessionResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub name: String,
}

/// POST /review/guest-session - Capture an unauthenticated reviewer's identity
///
/// A returning guest gets a fresh session each time; there is no lookup by
/// name or email on purpose.
pub async fn create_guest_session(
    State(ctx): State<AppContext>,
    Json(req): Json<GuestSessionRequest>,
) -> Result<(StatusCode, Json<GuestSessionResponse>), ApiError> {
    let identity = GuestIdentity::parse(req.name.as_deref().unwrap_or(""), req.email.as_deref())
        .map_err(error_response)?;

    let session = guests::create_session(&ctx.db, &identity)
        .await
        .map_err(error_response)?;

    info!("Guest session {} captured for {}", session.id, session.name);
    Ok((
        StatusCode::CREATED,
        Json(GuestSessionResponse {
            success: true,
            session_id: session.id,
            name: session.name,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub revision_id: Option<Uuid>,
    pub timestamp_secs: Option<f64>,
    pub body: Option<String>,
    /// Authenticated author; mutually exclusive with `guest_session_id`
    pub uid: Option<Uuid>,
    pub guest_session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: Comment,
}

/// Resolve comment attribution from either a user id or a guest session.
///
/// Returns `(author_id, author_name)`; guests carry no author id so the
/// display name is the only attribution that survives.
async fn resolve_author(
    ctx: &AppContext,
    uid: Option<Uuid>,
    guest_session_id: Option<Uuid>,
) -> Result<(Option<Uuid>, String), ApiError> {
    if let Some(uid) = uid {
        let user = users::get_user(&ctx.db, uid)
            .await
            .map_err(error_response)?
            .ok_or_else(|| {
                error_response(frameline_common::Error::NotFound(format!("user {}", uid)))
            })?;
        return Ok((Some(user.uid), user.display_name));
    }
    if let Some(session_id) = guest_session_id {
        let session = guests::get_session(&ctx.db, session_id)
            .await
            .map_err(error_response)?
            .ok_or_else(|| {
                error_response(frameline_common::Error::NotFound(format!(
                    "guest session {}",
                    session_id
                )))
            })?;
        return Ok((None, session.name));
    }
    Err(bad_request("either uid or guest_session_id is required"))
}

/// POST /projects/:id/comments - Anchor a comment to a revision timestamp
pub async fn create_comment(
    State(ctx): State<AppContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let revision_id = req
        .revision_id
        .ok_or_else(|| bad_request("revision_id is required"))?;
    let timestamp_secs = req
        .timestamp_secs
        .ok_or_else(|| bad_request("timestamp_secs is required"))?;
    if !timestamp_secs.is_finite() || timestamp_secs < 0.0 {
        return Err(bad_request("timestamp_secs must be a non-negative number"));
    }
    let body = req
        .body
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| bad_request("body is required"))?;

    projects::get_project(&ctx.db, project_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "project {}",
                project_id
            )))
        })?;
    revisions::get_revision(&ctx.db, revision_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "revision {}",
                revision_id
            )))
        })?;

    let (author_id, author_name) = resolve_author(&ctx, req.uid, req.guest_session_id).await?;

    let comment = Comment {
        id: Uuid::new_v4(),
        project_id,
        revision_id,
        author_id,
        author_name,
        timestamp_secs,
        body: body.to_string(),
        status: CommentStatus::Open,
        created_at: chrono::Utc::now(),
    };
    comments::create_comment(&ctx.db, &comment)
        .await
        .map_err(error_response)?;

    // The comment document exists whether or not any worker is listening
    ctx.bus.emit_lossy(ChangeEvent::CommentCreated {
        project_id,
        revision_id,
        comment_id: comment.id,
        author_id,
        timestamp: comment.created_at,
    });

    info!(
        "Comment {} at {:.1}s on revision {}",
        comment.id, timestamp_secs, revision_id
    );
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            success: true,
            comment,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub success: bool,
    pub comments: Vec<Comment>,
}

/// GET /projects/:id/revisions/:rev/comments - Comments ordered by offset
pub async fn list_comments(
    State(ctx): State<AppContext>,
    Path((_project_id, revision_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = comments::list_for_revision(&ctx.db, revision_id)
        .await
        .map_err(error_response)?;
    Ok(Json(CommentListResponse {
        success: true,
        comments,
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
}

/// POST /comments/:id/resolve
pub async fn resolve_comment(
    State(ctx): State<AppContext>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    comments::set_status(&ctx.db, comment_id, CommentStatus::Resolved)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse { success: true }))
}

/// POST /comments/:id/reopen
pub async fn reopen_comment(
    State(ctx): State<AppContext>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    comments::set_status(&ctx.db, comment_id, CommentStatus::Open)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct AddReplyRequest {
    pub body: Option<String>,
    pub uid: Option<Uuid>,
    pub guest_session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub success: bool,
    pub reply: CommentReply,
}

/// POST /comments/:id/replies - Threaded reply under a timeline comment
pub async fn add_reply(
    State(ctx): State<AppContext>,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<AddReplyRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), ApiError> {
    let body = req
        .body
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| bad_request("body is required"))?;

    comments::get_comment(&ctx.db, comment_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "comment {}",
                comment_id
            )))
        })?;

    let (author_id, author_name) = resolve_author(&ctx, req.uid, req.guest_session_id).await?;

    let reply = CommentReply {
        id: Uuid::new_v4(),
        comment_id,
        author_id,
        author_name,
        body: body.to_string(),
        created_at: chrono::Utc::now(),
    };
    comments::add_reply(&ctx.db, &reply).await.map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse {
            success: true,
            reply,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
}

/// GET /users/:uid/notifications - Newest first
pub async fn list_notifications(
    State(ctx): State<AppContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let notifications = notifications::list_for_user(&ctx.db, user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(NotificationListResponse {
        success: true,
        notifications,
    }))
}

/// POST /notifications/:id/read
pub async fn mark_notification_read(
    State(ctx): State<AppContext>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    notifications::mark_read(&ctx.db, notification_id)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse { success: true }))
}
