pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::assets::handlers as assets;
use crate::copilot::handlers as copilot;
use crate::crm::handlers as crm;
use crate::deals::handlers as deals;
use crate::recommendations::handlers as recommendations;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Deals
        .route("/api/v1/deals", get(deals::handle_list_deals))
        .route(
            "/api/v1/deals/:id",
            get(deals::handle_get_deal).patch(deals::handle_update_deal),
        )
        .route("/api/v1/deals/:id/context", put(deals::handle_save_context))
        .route("/api/v1/deals/:id/similar", get(deals::handle_similar_deals))
        .route(
            "/api/v1/deals/:id/recommendations",
            get(deals::handle_deal_recommendations),
        )
        .route(
            "/api/v1/deals/:id/comments",
            get(deals::handle_list_comments).post(deals::handle_add_comment),
        )
        .route(
            "/api/v1/deals/:id/linked-assets",
            get(deals::handle_list_linked_assets).post(deals::handle_link_asset),
        )
        .route(
            "/api/v1/deals/:id/linked-assets/from-recommendations",
            post(deals::handle_link_recommendations),
        )
        .route(
            "/api/v1/milestones/upcoming",
            get(deals::handle_upcoming_milestones),
        )
        .route(
            "/api/v1/linked-assets/:id",
            delete(deals::handle_unlink_asset),
        )
        // Asset library
        .route(
            "/api/v1/assets",
            get(assets::handle_list_assets).post(assets::handle_create_asset),
        )
        .route(
            "/api/v1/assets/analytics",
            get(assets::handle_content_analytics),
        )
        .route(
            "/api/v1/assets/:id",
            get(assets::handle_get_asset).put(assets::handle_edit_asset),
        )
        .route(
            "/api/v1/assets/:id/versions",
            get(assets::handle_asset_versions),
        )
        .route("/api/v1/assets/:id/view", post(assets::handle_record_view))
        .route(
            "/api/v1/assets/:id/comments",
            get(assets::handle_list_asset_comments).post(assets::handle_add_asset_comment),
        )
        .route(
            "/api/v1/assets/:id/deals",
            get(assets::handle_deals_using_asset),
        )
        .route("/api/v1/assets/:id/feedback", put(assets::handle_feedback))
        // Recommendations
        .route(
            "/api/v1/recommendations/search",
            post(recommendations::handle_search),
        )
        .route(
            "/api/v1/recommendations/similar/:asset_id",
            get(recommendations::handle_similar),
        )
        .route(
            "/api/v1/users/:user_id/recent-searches",
            get(recommendations::handle_recent_searches),
        )
        // Copilot
        .route(
            "/api/v1/copilot/deal-insights",
            post(copilot::handle_deal_insights),
        )
        .route(
            "/api/v1/copilot/follow-up-email",
            post(copilot::handle_follow_up_email),
        )
        // CRM edge function
        .route(
            "/functions/sync-comment-to-hubspot",
            post(crm::handle_sync_comment),
        )
        .with_state(state)
}
