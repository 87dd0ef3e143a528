use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::engagement::{AssetFeedback, Vote};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Insert(Vote),
    Replace(Vote),
    Remove,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackState {
    pub asset_id: Uuid,
    pub user_id: Uuid,
    /// `None` once a repeated vote has cleared it.
    pub vote: Option<Vote>,
}

/// Same vote twice clears it; a different vote replaces it.
pub fn resolve_vote(current: Option<Vote>, requested: Vote) -> VoteAction {
    match current {
        None => VoteAction::Insert(requested),
        Some(v) if v == requested => VoteAction::Remove,
        Some(_) => VoteAction::Replace(requested),
    }
}

pub async fn toggle_feedback(
    store: &dyn Store,
    asset_id: Uuid,
    user_id: Uuid,
    requested: Vote,
) -> Result<FeedbackState, AppError> {
    store
        .get_asset(asset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;

    // A stored vote outside up/down is treated as absent and overwritten.
    let current = store
        .get_feedback(asset_id, user_id)
        .await?
        .and_then(|f| Vote::parse(&f.vote));

    let action = resolve_vote(current, requested);
    debug!("Feedback on asset {asset_id} by {user_id}: {action:?}");

    let vote = match action {
        VoteAction::Remove => {
            store.delete_feedback(asset_id, user_id).await?;
            None
        }
        VoteAction::Insert(v) | VoteAction::Replace(v) => {
            store
                .put_feedback(&AssetFeedback {
                    id: Uuid::new_v4(),
                    asset_id,
                    user_id,
                    vote: v.as_str().to_string(),
                    created_at: Utc::now(),
                })
                .await?;
            Some(v)
        }
    };

    Ok(FeedbackState {
        asset_id,
        user_id,
        vote,
    })
}
