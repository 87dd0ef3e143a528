use axum::{extract::State, Json};
use serde::Deserialize;

use crate::copilot::compose::{deal_insights, follow_up_email, DealInsights, FollowUpEmail};
use crate::errors::AppError;
use crate::recommendations::engine::recommend_for_query;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CopilotRequest {
    pub text: String,
}

/// POST /api/v1/copilot/deal-insights
pub async fn handle_deal_insights(
    State(state): State<AppState>,
    Json(req): Json<CopilotRequest>,
) -> Result<Json<DealInsights>, AppError> {
    let recs =
        recommend_for_query(state.store.as_ref(), state.recommender.as_ref(), &req.text).await?;
    Ok(Json(deal_insights(&req.text, recs)))
}

/// POST /api/v1/copilot/follow-up-email
pub async fn handle_follow_up_email(
    State(state): State<AppState>,
    Json(req): Json<CopilotRequest>,
) -> Result<Json<FollowUpEmail>, AppError> {
    let recs =
        recommend_for_query(state.store.as_ref(), state.recommender.as_ref(), &req.text).await?;
    Ok(Json(follow_up_email(&req.text, recs)))
}
