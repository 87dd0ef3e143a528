use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::crm::{CrmError, CrmSyncOutcome};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SyncCommentRequest {
    pub hubspot_deal_id: Option<String>,
    pub comment: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Maps a sync attempt onto the edge-function contract. CRM rejections are
/// reported with status 200 and an `error` body; transport failures are 500.
pub fn sync_response(result: Result<CrmSyncOutcome, CrmError>) -> (StatusCode, Value) {
    match result {
        Ok(outcome) => (StatusCode::OK, json!(outcome)),
        Err(CrmError::Api { message, .. }) => (
            StatusCode::OK,
            json!({ "error": "Failed to sync to HubSpot", "details": message }),
        ),
        Err(e) => {
            error!("CRM sync failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": e.to_string() }),
            )
        }
    }
}

/// POST /functions/sync-comment-to-hubspot
pub async fn handle_sync_comment(
    State(state): State<AppState>,
    Json(req): Json<SyncCommentRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(deal_id), Some(comment)) = (non_empty(&req.hubspot_deal_id), non_empty(&req.comment))
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing hubspot_deal_id or comment" })),
        );
    };

    let (status, body) = sync_response(state.crm.sync_note(deal_id, comment).await);
    (status, Json(body))
}
