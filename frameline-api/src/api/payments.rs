//! Payment handlers: order creation and signed-callback capture

use super::{bad_request, error_response, ApiError};
use crate::AppContext;
use axum::{extract::State, http::StatusCode, Json};
use frameline_common::db::projects;
use frameline_common::events::ChangeEvent;
use frameline_common::gateway;
use frameline_common::status::{PaymentStatus, ProjectStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub project_id: Option<Uuid>,
    /// Amount in major units (rupees)
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    /// Amount in minor units (paise), as the gateway echoes it
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// POST /payments/order - Create a gateway order for a project payment
///
/// Amounts below the gateway minimum are rejected before any gateway call
/// goes out; the gateway never sees an order we already know is invalid.
pub async fn create_order(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let project_id = req
        .project_id
        .ok_or_else(|| bad_request("project_id is required"))?;
    let amount = req.amount.ok_or_else(|| bad_request("amount is required"))?;
    if !amount.is_finite() || amount < gateway::MIN_AMOUNT {
        return Err(bad_request("amount must be at least \u{20b9}1"));
    }

    projects::get_project(&ctx.db, project_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(frameline_common::Error::NotFound(format!(
                "project {}",
                project_id
            )))
        })?;

    let receipt = gateway::receipt_for(
        &project_id.to_string(),
        chrono::Utc::now().timestamp(),
    );
    let order = ctx
        .gateway
        .create_order(gateway::to_minor_units(amount), "INR", &receipt)
        .await
        .map_err(error_response)?;

    info!(
        "Gateway order {} created for project {} ({} paise)",
        order.order_id, project_id, order.amount
    );
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            order_id: order.order_id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub project_id: Option<Uuid>,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    /// Amount in major units, as charged
    pub amount: Option<f64>,
    /// "initial" (partial) or "final" (settles the balance)
    pub payment_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub payment_status: PaymentStatus,
}

/// POST /payments/verify - Verify the gateway callback and credit the payment
///
/// The signature check happens before any write; a tampered callback leaves
/// the project untouched. A verified final payment on an approved project
/// also moves the project to completed.
pub async fn verify_payment(
    State(ctx): State<AppContext>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let project_id = req
        .project_id
        .ok_or_else(|| bad_request("project_id is required"))?;
    let order_id = req
        .order_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad_request("order_id is required"))?;
    let payment_id = req
        .payment_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad_request("payment_id is required"))?;
    let signature = req
        .signature
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad_request("signature is required"))?;
    let amount = req.amount.ok_or_else(|| bad_request("amount is required"))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(bad_request("amount must be a positive number"));
    }
    let payment_status = match req.payment_type.as_deref() {
        Some("initial") => PaymentStatus::PartiallyPaid,
        Some("final") => PaymentStatus::Paid,
        _ => return Err(bad_request("payment_type must be \"initial\" or \"final\"")),
    };

    gateway::verify(
        order_id,
        payment_id,
        ctx.gateway_secret.as_bytes(),
        signature,
    )
    .map_err(|e| {
        warn!("Rejected payment callback for order {}: bad signature", order_id);
        error_response(e)
    })?;

    projects::credit_payment(&ctx.db, project_id, amount, payment_status)
        .await
        .map_err(error_response)?;

    ctx.bus.emit_lossy(ChangeEvent::PaymentCaptured {
        project_id,
        order_id: order_id.to_string(),
        amount,
        timestamp: chrono::Utc::now(),
    });

    // A settled final payment closes out an approved project. The credit
    // stands even when the project is in some other state.
    if payment_status == PaymentStatus::Paid {
        match projects::update_status(&ctx.db, project_id, ProjectStatus::Completed).await {
            Ok(Some((old, new))) => {
                ctx.bus.emit_lossy(ChangeEvent::ProjectUpdated {
                    project_id,
                    old_status: old,
                    new_status: new,
                    timestamp: chrono::Utc::now(),
                });
            }
            Ok(None) => {}
            // A final payment on a project that was never approved is a
            // legitimate settlement; the credit stands and the project
            // keeps its current status.
            Err(e @ frameline_common::Error::InvalidTransition(_)) => {
                warn!(
                    "Payment captured but project {} stays un-completed: {}",
                    project_id, e
                );
            }
            // A store failure after the credit is a real fault the caller
            // must hear about
            Err(e) => return Err(error_response(e)),
        }
    }

    info!(
        "Payment {} captured for project {} ({})",
        payment_id, project_id, amount
    );
    Ok(Json(VerifyPaymentResponse {
        success: true,
        payment_status,
    }))
}
