use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::recommendations::engine::{recommend_for_query, recommend_similar, RecommendedAsset};
use crate::recommendations::recent::{recent_searches, remember_search};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Searches are only remembered for an identified user.
    pub user_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub recommendations: Vec<RecommendedAsset>,
    pub recent_searches: Vec<String>,
}

/// POST /api/v1/recommendations/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let recommendations =
        recommend_for_query(state.store.as_ref(), state.recommender.as_ref(), &req.query).await?;
    info!(
        "Search returned {} assets (backend: {})",
        recommendations.len(),
        state.recommender.backend()
    );

    let recent_searches = match req.user_id {
        Some(user_id) => remember_search(state.recent_searches.as_ref(), user_id, &req.query).await,
        None => Vec::new(),
    };

    Ok(Json(SearchResponse {
        recommendations,
        recent_searches,
    }))
}

/// GET /api/v1/recommendations/similar/:asset_id
pub async fn handle_similar(
    State(state): State<AppState>,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<Vec<RecommendedAsset>>, AppError> {
    let recs =
        recommend_similar(state.store.as_ref(), state.recommender.as_ref(), asset_id).await?;
    Ok(Json(recs))
}

/// GET /api/v1/users/:user_id/recent-searches
pub async fn handle_recent_searches(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<String>> {
    Json(recent_searches(state.recent_searches.as_ref(), user_id).await)
}
