//! Contribution initiation and the public verified feed.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use engine::InitiateRequest;
use serde::{Deserialize, Serialize};
use stats::RecentContribution;
use store::ContributionStore;

use crate::AppState;
use crate::error::ApiError;

/// Default number of entries in the verified feed.
const DEFAULT_FEED_LIMIT: usize = 10;

#[derive(Deserialize)]
pub struct InitiateContributionRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct InitiateContributionResponse {
    pub contribution_id: String,
    pub correlation_id: String,
    pub customer_message: Option<String>,
}

#[derive(Deserialize)]
pub struct FeedParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub contributions: Vec<RecentContribution>,
}

/// POST /contributions — validate, create a pending record, and push
/// the payment to the contributor's phone.
pub async fn initiate<S: ContributionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<InitiateContributionRequest>,
) -> Result<(StatusCode, Json<InitiateContributionResponse>), ApiError> {
    let receipt = state
        .reconciler
        .initiate(InitiateRequest {
            full_name: req.name,
            phone: req.phone,
            email: req.email,
            amount_kes: req.amount,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InitiateContributionResponse {
            contribution_id: receipt.contribution_id.to_string(),
            correlation_id: receipt.correlation_id.to_string(),
            customer_message: receipt.customer_message,
        }),
    ))
}

/// GET /contributions/recent — the most recent verified contributions.
pub async fn recent<S: ContributionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let contributions = state.stats.recent_contributions(limit).await?;
    Ok(Json(FeedResponse { contributions }))
}
