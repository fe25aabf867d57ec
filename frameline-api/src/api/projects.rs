//! Project and revision request handlers

use super::{bad_request, error_response, ApiError};
use crate::AppContext;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use frameline_common::db::models::{Project, Revision};
use frameline_common::db::{comments, projects, revisions};
use frameline_common::events::ChangeEvent;
use frameline_common::status::{PaymentStatus, ProjectStatus};
use frameline_common::timeline::{self, Marker};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub total_cost: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
}

/// POST /projects - Create a project awaiting assignment
pub async fn create_project(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| bad_request("title is required"))?;

    let total_cost = req.total_cost.unwrap_or(0.0);
    if total_cost < 0.0 {
        return Err(bad_request("total_cost cannot be negative"));
    }

    let now = chrono::Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        title: title.to_string(),
        status: ProjectStatus::PendingAssignment,
        payment_status: PaymentStatus::Unpaid,
        total_cost,
        amount_paid: 0.0,
        current_revision_id: None,
        created_at: now,
        updated_at: now,
    };
    projects::create_project(&ctx.db, &project)
        .await
        .map_err(error_response)?;

    info!("Created project {} ({})", project.id, project.title);
    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            success: true,
            project,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    /// Activate a pending project once its first member is assigned
    #[serde(default)]
    pub activate: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
}

/// POST /projects/:id/members - Add a user to the member set
pub async fn add_member(
    State(ctx): State<AppContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let project = projects::get_project(&ctx.db, project_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "project {}",
                project_id
            )))
        })?;

    projects::add_member(&ctx.db, project_id, req.user_id)
        .await
        .map_err(error_response)?;

    if req.activate && project.status == ProjectStatus::PendingAssignment {
        if let Some((old, new)) =
            projects::update_status(&ctx.db, project_id, ProjectStatus::Active)
                .await
                .map_err(error_response)?
        {
            ctx.bus.emit_lossy(ChangeEvent::ProjectUpdated {
                project_id,
                old_status: old,
                new_status: new,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    Ok(Json(StatusResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct UploadRevisionRequest {
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RevisionResponse {
    pub success: bool,
    pub revision: Revision,
}

/// POST /projects/:id/revisions - Record an uploaded revision
///
/// The video itself already lives in the object store; this endpoint only
/// records its URL, makes the revision current, and moves the project into
/// review. The revision row is immutable from here on.
pub async fn upload_revision(
    State(ctx): State<AppContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UploadRevisionRequest>,
) -> Result<(StatusCode, Json<RevisionResponse>), ApiError> {
    let video_url = req
        .video_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| bad_request("video_url is required"))?;

    let duration_secs = req.duration_secs.unwrap_or(0.0);
    if duration_secs < 0.0 || !duration_secs.is_finite() {
        return Err(bad_request("duration_secs must be a non-negative number"));
    }

    let project = projects::get_project(&ctx.db, project_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "project {}",
                project_id
            )))
        })?;

    // Reject before the first write: a failed upload must leave neither a
    // revision row nor a dangling current_revision_id behind.
    if project.status != ProjectStatus::InReview
        && !project.status.can_transition(ProjectStatus::InReview)
    {
        return Err(error_response(frameline_common::Error::InvalidTransition(
            format!("{} -> {}", project.status, ProjectStatus::InReview),
        )));
    }

    let version = revisions::next_version(&ctx.db, project_id)
        .await
        .map_err(error_response)?;
    let revision = Revision {
        id: Uuid::new_v4(),
        project_id,
        version,
        video_url: video_url.to_string(),
        thumbnail_url: req.thumbnail_url.clone(),
        duration_secs,
        created_at: chrono::Utc::now(),
    };

    revisions::create_revision(&ctx.db, &revision)
        .await
        .map_err(error_response)?;
    projects::set_current_revision(&ctx.db, project_id, revision.id)
        .await
        .map_err(error_response)?;

    // A fresh upload (re)enters review; a project already in review stays
    // there without firing the status hook.
    if let Some((old, new)) = projects::update_status(&ctx.db, project_id, ProjectStatus::InReview)
        .await
        .map_err(error_response)?
    {
        ctx.bus.emit_lossy(ChangeEvent::ProjectUpdated {
            project_id,
            old_status: old,
            new_status: new,
            timestamp: chrono::Utc::now(),
        });
    }

    ctx.bus.emit_lossy(ChangeEvent::RevisionUploaded {
        project_id,
        revision_id: revision.id,
        version,
        timestamp: chrono::Utc::now(),
    });

    info!("Revision v{} uploaded for project {}", version, project_id);
    Ok((
        StatusCode::CREATED,
        Json(RevisionResponse {
            success: true,
            revision,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct MarkersResponse {
    pub success: bool,
    pub duration_secs: f64,
    pub markers: Vec<Marker>,
}

/// GET /projects/:id/revisions/:rev/markers - Timeline markers for a revision
///
/// An unknown duration yields an empty marker list, never a division.
pub async fn get_markers(
    State(ctx): State<AppContext>,
    Path((_project_id, revision_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MarkersResponse>, ApiError> {
    let revision = revisions::get_revision(&ctx.db, revision_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "revision {}",
                revision_id
            )))
        })?;

    let comments = comments::list_for_revision(&ctx.db, revision_id)
        .await
        .map_err(error_response)?;

    Ok(Json(MarkersResponse {
        success: true,
        duration_secs: revision.duration_secs,
        markers: timeline::markers(&comments, revision.duration_secs),
    }))
}
