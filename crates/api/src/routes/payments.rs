//! Provider webhook, gateway-backed poll, and local status lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CorrelationId;
use domain::RESULT_SUCCESS;
use engine::{ContributionView, StatusSnapshot};
use gateway::CallbackEnvelope;
use serde::{Deserialize, Serialize};
use store::ContributionStore;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct CallbackAckResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct PollRequest {
    pub correlation_id: String,
}

/// POST /payments/callback — the provider's payment-result webhook.
///
/// Idempotent under redelivery: a verified record acknowledges with
/// 200 and "Already processed". A failure result is applied to the
/// record and acknowledged with 400, matching what the provider
/// expects for unsuccessful payments.
pub async fn callback<S: ContributionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(envelope): Json<CallbackEnvelope>,
) -> Result<(StatusCode, Json<CallbackAckResponse>), ApiError> {
    let cb = envelope.body.stk_callback;
    let correlation_id = CorrelationId::new(cb.checkout_request_id.clone());
    let confirmation = cb.confirmation();

    let ack = state
        .reconciler
        .apply_callback(&correlation_id, cb.result_code, &cb.result_desc, confirmation)
        .await?;

    if ack.is_already_processed() {
        return Ok((
            StatusCode::OK,
            Json(CallbackAckResponse {
                success: true,
                message: "Already processed".to_string(),
            }),
        ));
    }

    if cb.result_code == RESULT_SUCCESS {
        Ok((
            StatusCode::OK,
            Json(CallbackAckResponse {
                success: true,
                message: "Payment verified".to_string(),
            }),
        ))
    } else {
        // The non-success result is recorded before this ack goes out.
        Ok((
            StatusCode::BAD_REQUEST,
            Json(CallbackAckResponse {
                success: false,
                message: format!("Payment failed: {}", cb.result_desc),
            }),
        ))
    }
}

/// POST /payments/status — query the provider and settle the answer.
pub async fn poll<S: ContributionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PollRequest>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let correlation_id = CorrelationId::new(req.correlation_id);
    let snapshot = state.reconciler.poll(&correlation_id).await?;
    Ok(Json(snapshot))
}

/// GET /payments/{correlation_id} — the stored record's view, without
/// touching the gateway.
pub async fn local_status<S: ContributionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(correlation_id): Path<String>,
) -> Result<Json<ContributionView>, ApiError> {
    let correlation_id = CorrelationId::new(correlation_id);
    let view = state.reconciler.local_status(&correlation_id).await?;
    Ok(Json(view))
}
