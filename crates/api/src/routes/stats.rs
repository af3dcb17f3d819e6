//! Campaign statistics endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use stats::CampaignStats;
use store::ContributionStore;

use crate::AppState;
use crate::error::ApiError;

/// GET /stats — total raised, progress, and the event countdown.
pub async fn get<S: ContributionStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CampaignStats>, ApiError> {
    let stats = state.stats.campaign_stats().await?;
    Ok(Json(stats))
}
