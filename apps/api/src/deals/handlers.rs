use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deals::comments::{add_deal_comment, DealCommentResult};
use crate::deals::completeness::{compute_completeness, CompletenessReport};
use crate::deals::health::{health_breakdown, HealthBreakdown};
use crate::deals::linking::{link_asset, link_recommended_assets, unlink_asset};
use crate::deals::pipeline::{
    activity_status, milestone_window, next_action_urgency, similar_deals, task_progress,
    upcoming_milestones, ActionUrgency, ActivityStatus, TaskProgress, UpcomingMilestone,
    SIMILAR_DEALS_LIMIT,
};
use crate::errors::AppError;
use crate::models::activity::{DealActivity, DealTask};
use crate::models::deal::{Deal, DealContext, DealContextInput, DealPatch};
use crate::models::engagement::{DealComment, LinkedAsset, Recommendation};
use crate::state::AppState;
use crate::store::Store;

/// Stored recommendations shown on the deal detail view.
const DETAIL_RECOMMENDATION_LIMIT: i64 = 6;
const DETAIL_ACTIVITY_LIMIT: i64 = 5;

async fn load_deal(store: &dyn Store, id: Uuid) -> Result<Deal, AppError> {
    store
        .get_deal(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Deal {id} not found")))
}

#[derive(Deserialize)]
pub struct DealListQuery {
    pub cloud_provider: Option<String>,
}

#[derive(Serialize)]
pub struct DealSummary {
    #[serde(flatten)]
    pub deal: Deal,
    pub completeness: CompletenessReport,
    pub activity: ActivityStatus,
    pub tasks: TaskProgress,
}

/// GET /api/v1/deals
pub async fn handle_list_deals(
    State(state): State<AppState>,
    Query(params): Query<DealListQuery>,
) -> Result<Json<Vec<DealSummary>>, AppError> {
    let deals = state.store.list_deals().await?;
    let contexts: HashMap<Uuid, DealContext> = state
        .store
        .list_deal_contexts()
        .await?
        .into_iter()
        .map(|c| (c.deal_id, c))
        .collect();

    let last_activity = state.store.latest_activity_times().await?;
    let mut tasks_by_deal: HashMap<Uuid, Vec<DealTask>> = HashMap::new();
    for task in state.store.list_tasks(None).await? {
        tasks_by_deal.entry(task.deal_id).or_default().push(task);
    }
    let now = Utc::now();

    let cloud = params
        .cloud_provider
        .filter(|c| !c.is_empty() && c != "all");

    let summaries = deals
        .into_iter()
        .filter(|d| match &cloud {
            Some(cloud) => contexts
                .get(&d.id)
                .and_then(|c| c.cloud_provider.as_deref())
                == Some(cloud.as_str()),
            None => true,
        })
        .map(|deal| {
            let completeness = compute_completeness(&deal, contexts.get(&deal.id));
            let activity = activity_status(last_activity.get(&deal.id).copied(), now);
            let tasks = task_progress(tasks_by_deal.get(&deal.id).into_iter().flatten());
            DealSummary {
                deal,
                completeness,
                activity,
                tasks,
            }
        })
        .collect();

    Ok(Json(summaries))
}

#[derive(Serialize)]
pub struct DealDetail {
    pub deal: Deal,
    pub context: Option<DealContext>,
    pub completeness: CompletenessReport,
    pub health: HealthBreakdown,
    pub next_action_urgency: Option<ActionUrgency>,
    pub recommendations: Vec<Recommendation>,
    pub linked_assets: Vec<LinkedAsset>,
    pub activity: ActivityStatus,
    /// Newest first.
    pub recent_activities: Vec<DealActivity>,
    pub task_progress: TaskProgress,
    pub tasks: Vec<DealTask>,
}

/// GET /api/v1/deals/:id
pub async fn handle_get_deal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DealDetail>, AppError> {
    let deal = load_deal(state.store.as_ref(), id).await?;
    let context = state.store.get_deal_context(id).await?;
    let recommendations = state
        .store
        .list_deal_recommendations(id, Some(DETAIL_RECOMMENDATION_LIMIT))
        .await?;
    let linked_assets = state.store.list_linked_assets(id).await?;
    let recent_activities = state
        .store
        .list_deal_activities(id, Some(DETAIL_ACTIVITY_LIMIT))
        .await?;
    let tasks = state.store.list_tasks(Some(id)).await?;
    let now = Utc::now();

    Ok(Json(DealDetail {
        completeness: compute_completeness(&deal, context.as_ref()),
        health: health_breakdown(&deal.health_flags),
        next_action_urgency: next_action_urgency(&deal, now.date_naive()),
        activity: activity_status(recent_activities.first().map(|a| a.created_at), now),
        task_progress: task_progress(&tasks),
        deal,
        context,
        recommendations,
        linked_assets,
        recent_activities,
        tasks,
    }))
}

/// GET /api/v1/milestones/upcoming
pub async fn handle_upcoming_milestones(
    State(state): State<AppState>,
) -> Result<Json<Vec<UpcomingMilestone>>, AppError> {
    let today = Utc::now().date_naive();
    let (from, to) = milestone_window(today);
    let milestones = state.store.list_open_milestones(from, to).await?;
    let names: HashMap<Uuid, String> = state
        .store
        .list_deals()
        .await?
        .into_iter()
        .map(|d| (d.id, d.company_name))
        .collect();
    Ok(Json(upcoming_milestones(milestones, &names, today)))
}

/// PATCH /api/v1/deals/:id
pub async fn handle_update_deal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DealPatch>,
) -> Result<Json<Deal>, AppError> {
    let mut deal = load_deal(state.store.as_ref(), id).await?;
    patch.apply(&mut deal);
    let updated = state.store.update_deal(&deal).await?;
    tracing::info!("Updated deal {id} (stage: {})", updated.stage);
    Ok(Json(updated))
}

#[derive(Serialize)]
pub struct ContextSaved {
    pub context: DealContext,
    pub completeness: CompletenessReport,
}

/// PUT /api/v1/deals/:id/context
pub async fn handle_save_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DealContextInput>,
) -> Result<Json<ContextSaved>, AppError> {
    let deal = load_deal(state.store.as_ref(), id).await?;
    let context = state.store.upsert_deal_context(id, &input).await?;
    let completeness = compute_completeness(&deal, Some(&context));
    Ok(Json(ContextSaved {
        context,
        completeness,
    }))
}

/// GET /api/v1/deals/:id/similar
pub async fn handle_similar_deals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Deal>>, AppError> {
    let deal = load_deal(state.store.as_ref(), id).await?;
    let all = state.store.list_deals().await?;
    Ok(Json(similar_deals(&deal, &all, SIMILAR_DEALS_LIMIT)))
}

/// GET /api/v1/deals/:id/recommendations
pub async fn handle_deal_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    load_deal(state.store.as_ref(), id).await?;
    Ok(Json(state.store.list_deal_recommendations(id, None).await?))
}

/// GET /api/v1/deals/:id/comments
pub async fn handle_list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DealComment>>, AppError> {
    Ok(Json(state.store.list_deal_comments(id).await?))
}

#[derive(Deserialize)]
pub struct NewDealComment {
    pub user_id: Option<Uuid>,
    pub comment_text: String,
}

/// POST /api/v1/deals/:id/comments
pub async fn handle_add_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewDealComment>,
) -> Result<(StatusCode, Json<DealCommentResult>), AppError> {
    let result =
        add_deal_comment(state.store.as_ref(), &state.crm, id, req.user_id, &req.comment_text)
            .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/v1/deals/:id/linked-assets
pub async fn handle_list_linked_assets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LinkedAsset>>, AppError> {
    Ok(Json(state.store.list_linked_assets(id).await?))
}

#[derive(Deserialize)]
pub struct LinkRequest {
    pub asset_id: Uuid,
    pub linked_by: Option<Uuid>,
}

/// POST /api/v1/deals/:id/linked-assets
pub async fn handle_link_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LinkRequest>,
) -> Result<(StatusCode, Json<LinkedAsset>), AppError> {
    let link = link_asset(state.store.as_ref(), id, req.asset_id, req.linked_by).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

#[derive(Deserialize, Default)]
pub struct LinkAllRequest {
    pub linked_by: Option<Uuid>,
}

/// POST /api/v1/deals/:id/linked-assets/from-recommendations
///
/// The body is optional; a bare POST links with no `linked_by`.
pub async fn handle_link_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<LinkAllRequest>>,
) -> Result<Json<Vec<LinkedAsset>>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(
        link_recommended_assets(state.store.as_ref(), id, req.linked_by).await?,
    ))
}

/// DELETE /api/v1/linked-assets/:id
pub async fn handle_unlink_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    unlink_asset(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
