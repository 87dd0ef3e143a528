use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored (deal, asset) pairing. Confidence is heuristic, never model-derived.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub asset_id: Uuid,
    pub reason: String,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LinkedAsset {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub asset_id: Uuid,
    pub linked_by: Option<Uuid>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DealComment {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub user_id: Option<Uuid>,
    pub comment_text: String,
    pub synced_to_crm: bool,
    pub crm_note_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetComment {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }

    pub fn parse(s: &str) -> Option<Vote> {
        match s {
            "up" => Some(Vote::Up),
            "down" => Some(Vote::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetFeedback {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub user_id: Uuid,
    pub vote: String,
    pub created_at: DateTime<Utc>,
}
