//! Provisioning and admin request handlers

use super::{bad_request, error_response, ApiError};
use crate::{identity, AppContext};
use axum::{extract::State, http::StatusCode, Json};
use frameline_common::db::models::Role;
use frameline_common::db::settings;
use frameline_common::Error;
use rand::distributions::{Alphanumeric, DistString};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "frameline-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub uid: Uuid,
    pub role: Role,
}

/// POST /admin/users - Create a staff account
///
/// Three writes (directory account, profile, role claim) with no rollback;
/// a later-step failure leaves the earlier writes in place and surfaces as
/// a server error.
pub async fn create_staff_user(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let role = parse_provisionable_role(req.role.as_deref())?;
    if !role.is_staff() {
        return Err(bad_request(format!(
            "role {} cannot be created through staff provisioning",
            role
        )));
    }
    provision(&ctx, req, role).await
}

/// POST /sales/clients - Create a client account
///
/// Sales-created accounts are always clients; a request asking for any
/// other role is rejected rather than silently downgraded.
pub async fn create_sales_client(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    if let Some(role) = req.role.as_deref() {
        if parse_provisionable_role(Some(role))? != Role::Client {
            return Err(bad_request("sales provisioning only creates client accounts"));
        }
    }
    provision(&ctx, req, Role::Client).await
}

async fn provision(
    ctx: &AppContext,
    req: CreateUserRequest,
    role: Role,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let email = non_empty(req.email.as_deref()).ok_or_else(|| bad_request("email is required"))?;
    let password =
        non_empty(req.password.as_deref()).ok_or_else(|| bad_request("password is required"))?;
    let display_name = non_empty(req.display_name.as_deref())
        .ok_or_else(|| bad_request("display_name is required"))?;

    match identity::provision_user(
        &ctx.directory,
        &ctx.db,
        email,
        password,
        display_name,
        req.phone.as_deref(),
        role,
    )
    .await
    {
        Ok(uid) => Ok((
            StatusCode::CREATED,
            Json(CreateUserResponse {
                success: true,
                uid,
                role,
            }),
        )),
        Err(e) => {
            error!("Provisioning {} failed: {}", email, e);
            Err(error_response(e))
        }
    }
}

/// Validate a role string against the provisionable set.
///
/// `guest` is a real role but never provisioned: guest identities come from
/// the review capture flow, not from an account.
fn parse_provisionable_role(role: Option<&str>) -> Result<Role, ApiError> {
    let role = non_empty(role).ok_or_else(|| bad_request("role is required"))?;
    let role: Role = role
        .parse()
        .map_err(|e: Error| bad_request(e.to_string()))?;
    if role == Role::Guest {
        return Err(bad_request("invalid role: guest accounts cannot be provisioned"));
    }
    Ok(role)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize)]
pub struct EnsureDefaultResponse {
    pub success: bool,
    pub created: bool,
    pub email: String,
    /// Present only when the account was created by this call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

/// POST /admin/ensure-default - Seed the default admin account
///
/// Read-then-write without locking: two concurrent calls race, and the
/// loser's insert fails on the unique email index. That conflict is treated
/// as "already exists", so the endpoint is safe to call repeatedly.
pub async fn ensure_default_admin(
    State(ctx): State<AppContext>,
) -> Result<Json<EnsureDefaultResponse>, ApiError> {
    let email = settings::default_admin_email(&ctx.db)
        .await
        .map_err(error_response)?;

    if ctx
        .directory
        .lookup_by_email(&email)
        .await
        .map_err(error_response)?
        .is_some()
    {
        return Ok(Json(EnsureDefaultResponse {
            success: true,
            created: false,
            email,
            initial_password: None,
        }));
    }

    let name = settings::default_admin_name(&ctx.db)
        .await
        .map_err(error_response)?;
    let password = Alphanumeric.sample_string(&mut rand::thread_rng(), 24);

    match identity::provision_user(
        &ctx.directory,
        &ctx.db,
        &email,
        &password,
        &name,
        None,
        Role::Admin,
    )
    .await
    {
        Ok(_) => {
            info!("Default admin {} created", email);
            Ok(Json(EnsureDefaultResponse {
                success: true,
                created: true,
                email,
                initial_password: Some(password),
            }))
        }
        // Lost the race to a concurrent call; the account exists now
        Err(Error::Conflict(_)) => Ok(Json(EnsureDefaultResponse {
            success: true,
            created: false,
            email,
            initial_password: None,
        })),
        Err(e) => Err(error_response(e)),
    }
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub repaired: u32,
}

/// POST /admin/reconcile-roles - Read-repair drifted role claims
pub async fn reconcile_roles(
    State(ctx): State<AppContext>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let repaired = identity::reconcile_roles(&ctx.directory, &ctx.db)
        .await
        .map_err(error_response)?;

    Ok(Json(ReconcileResponse {
        success: true,
        repaired,
    }))
}
