use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A logged touchpoint on a deal ("Meeting Held", "Email Sent", "Demo Shown", ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DealActivity {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub activity_type: String,
    pub activity_title: String,
    pub created_at: DateTime<Utc>,
}

/// A dated checkpoint on a deal.
///
/// `milestone_type` is one of `demo`, `proposal`, `review`, `meeting`,
/// `deadline`, `follow_up`; it is stored and serialized as `type`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DealMilestone {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub milestone_type: String,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Status is `completed`, `overdue` or anything else for open work (usually `pending`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DealTask {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl DealTask {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}
