use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crm::CrmClient;
use crate::errors::AppError;
use crate::models::engagement::{AssetComment, DealComment};
use crate::store::Store;

/// Outcome of pushing a freshly stored comment to the CRM.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub crm_note_id: Option<String>,
    pub demo_mode: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealCommentResult {
    pub comment: DealComment,
    pub sync: SyncReport,
}

/// Trims comment text and rejects it when nothing is left.
pub fn validate_comment(text: &str) -> Result<String, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("comment cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Stores a deal comment, then mirrors it to the CRM.
///
/// The local row is written first and survives a failed sync; the failure is
/// reported in `sync` instead of failing the request.
pub async fn add_deal_comment(
    store: &dyn Store,
    crm: &CrmClient,
    deal_id: Uuid,
    user_id: Option<Uuid>,
    text: &str,
) -> Result<DealCommentResult, AppError> {
    let text = validate_comment(text)?;
    let deal = store
        .get_deal(deal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Deal {deal_id} not found")))?;

    let mut comment = store
        .insert_deal_comment(&DealComment {
            id: Uuid::new_v4(),
            deal_id,
            user_id,
            comment_text: text,
            synced_to_crm: false,
            crm_note_id: None,
            created_at: Utc::now(),
        })
        .await?;

    let deal_ref = deal
        .hubspot_deal_id
        .clone()
        .unwrap_or_else(|| deal_id.to_string());

    let sync = match crm.sync_note(&deal_ref, &comment.comment_text).await {
        Ok(outcome) => {
            // The CRM note already exists; a bookkeeping failure does not fail the request.
            match store
                .mark_deal_comment_synced(comment.id, &outcome.hubspot_note_id)
                .await
            {
                Ok(()) => {
                    comment.synced_to_crm = true;
                    comment.crm_note_id = Some(outcome.hubspot_note_id.clone());
                    info!(
                        "Comment {} synced to CRM as note {}",
                        comment.id, outcome.hubspot_note_id
                    );
                }
                Err(e) => warn!(
                    "Comment {} synced as note {} but could not be marked synced: {e}",
                    comment.id, outcome.hubspot_note_id
                ),
            }
            SyncReport {
                success: true,
                crm_note_id: Some(outcome.hubspot_note_id),
                demo_mode: outcome.demo_mode,
                error: None,
            }
        }
        Err(e) => {
            warn!("CRM sync failed for comment {}: {e}", comment.id);
            SyncReport {
                success: false,
                crm_note_id: None,
                demo_mode: crm.is_demo_mode(),
                error: Some(e.to_string()),
            }
        }
    };

    Ok(DealCommentResult { comment, sync })
}

pub async fn add_asset_comment(
    store: &dyn Store,
    asset_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> Result<AssetComment, AppError> {
    let text = validate_comment(text)?;
    store
        .get_asset(asset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;

    store
        .insert_asset_comment(&AssetComment {
            id: Uuid::new_v4(),
            asset_id,
            user_id,
            comment: text,
            created_at: Utc::now(),
        })
        .await
}
