use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::analytics::{compute_content_analytics, ContentAnalytics};
use crate::assets::feedback::{toggle_feedback, FeedbackState};
use crate::assets::library::{filter_assets, LibraryQuery};
use crate::assets::versioning::{create_asset, edit_asset};
use crate::deals::comments::add_asset_comment;
use crate::errors::AppError;
use crate::models::asset::{Asset, AssetEdit, AssetVersion, NewAsset};
use crate::models::deal::Deal;
use crate::models::engagement::{AssetComment, Vote};
use crate::state::AppState;

fn asset_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Asset {id} not found"))
}

/// GET /api/v1/assets
pub async fn handle_list_assets(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<Vec<Asset>>, AppError> {
    let assets = state.store.list_assets(None).await?;
    Ok(Json(filter_assets(assets, &query)))
}

/// POST /api/v1/assets
pub async fn handle_create_asset(
    State(state): State<AppState>,
    Json(req): Json<NewAsset>,
) -> Result<(StatusCode, Json<Asset>), AppError> {
    let asset = create_asset(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /api/v1/assets/:id
pub async fn handle_get_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, AppError> {
    let asset = state
        .store
        .get_asset(id)
        .await?
        .ok_or_else(|| asset_not_found(id))?;
    Ok(Json(asset))
}

#[derive(Serialize)]
pub struct AssetEdited {
    pub asset: Asset,
    pub version: AssetVersion,
}

/// PUT /api/v1/assets/:id
pub async fn handle_edit_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<AssetEdit>,
) -> Result<Json<AssetEdited>, AppError> {
    let (asset, version) = edit_asset(state.store.as_ref(), id, edit).await?;
    Ok(Json(AssetEdited { asset, version }))
}

/// GET /api/v1/assets/:id/versions
pub async fn handle_asset_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssetVersion>>, AppError> {
    Ok(Json(state.store.list_asset_versions(id).await?))
}

/// POST /api/v1/assets/:id/view
pub async fn handle_record_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, AppError> {
    let asset = state
        .store
        .record_asset_view(id)
        .await?
        .ok_or_else(|| asset_not_found(id))?;
    Ok(Json(asset))
}

/// GET /api/v1/assets/:id/comments
pub async fn handle_list_asset_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssetComment>>, AppError> {
    Ok(Json(state.store.list_asset_comments(id).await?))
}

#[derive(Deserialize)]
pub struct NewAssetComment {
    pub user_id: Uuid,
    pub comment: String,
}

/// POST /api/v1/assets/:id/comments
pub async fn handle_add_asset_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewAssetComment>,
) -> Result<(StatusCode, Json<AssetComment>), AppError> {
    let comment = add_asset_comment(state.store.as_ref(), id, req.user_id, &req.comment).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/assets/:id/deals
pub async fn handle_deals_using_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Deal>>, AppError> {
    Ok(Json(state.store.list_deals_using_asset(id).await?))
}

/// GET /api/v1/assets/analytics
pub async fn handle_content_analytics(
    State(state): State<AppState>,
) -> Result<Json<ContentAnalytics>, AppError> {
    let assets = state.store.list_assets(None).await?;
    let usage = state.store.asset_usage_counts().await?;
    Ok(Json(compute_content_analytics(&assets, &usage)))
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub user_id: Uuid,
    pub vote: Vote,
}

/// PUT /api/v1/assets/:id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackState>, AppError> {
    Ok(Json(
        toggle_feedback(state.store.as_ref(), id, req.user_id, req.vote).await?,
    ))
}
