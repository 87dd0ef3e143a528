use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deal {
    pub id: Uuid,
    pub company_name: String,
    pub amount: f64,
    pub stage: String,
    pub close_date: Option<NaiveDate>,
    pub assigned_ae_id: Option<Uuid>,
    pub industry: Option<String>,
    pub cloud_provider: Option<String>,
    pub notes: Option<String>,
    pub next_action: Option<String>,
    pub next_action_due_date: Option<NaiveDate>,
    pub health_flags: Vec<String>,
    pub hubspot_deal_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-text extension of a deal. At most one per deal, created on first save.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DealContext {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub description: Option<String>,
    pub primary_use_case: Option<String>,
    pub cloud_provider: Option<String>,
    pub primary_persona: Option<String>,
    pub meeting_notes: Option<String>,
    pub technical_requirements: Option<String>,
    pub pain_points: Vec<String>,
    pub competitor_landscape: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DealStage {
    Discovery,
    Demo,
    Proposal,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Discovery => "Discovery",
            DealStage::Demo => "Demo",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::ClosedWon => "Closed Won",
        }
    }
}

/// PATCH body for a deal. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealPatch {
    pub stage: Option<DealStage>,
    pub amount: Option<f64>,
    pub close_date: Option<NaiveDate>,
    pub industry: Option<String>,
    pub cloud_provider: Option<String>,
    pub notes: Option<String>,
    pub next_action: Option<String>,
    pub next_action_due_date: Option<NaiveDate>,
    pub health_flags: Option<Vec<String>>,
}

impl DealPatch {
    pub fn apply(self, deal: &mut Deal) {
        if let Some(stage) = self.stage {
            deal.stage = stage.as_str().to_string();
        }
        if let Some(amount) = self.amount {
            deal.amount = amount;
        }
        if self.close_date.is_some() {
            deal.close_date = self.close_date;
        }
        if self.industry.is_some() {
            deal.industry = self.industry;
        }
        if self.cloud_provider.is_some() {
            deal.cloud_provider = self.cloud_provider;
        }
        if self.notes.is_some() {
            deal.notes = self.notes;
        }
        if self.next_action.is_some() {
            deal.next_action = self.next_action;
        }
        if self.next_action_due_date.is_some() {
            deal.next_action_due_date = self.next_action_due_date;
        }
        if let Some(flags) = self.health_flags {
            deal.health_flags = flags;
        }
        deal.updated_at = Utc::now();
    }
}

/// Body for `PUT /deals/:id/context`. Replaces every context field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealContextInput {
    pub description: Option<String>,
    pub primary_use_case: Option<String>,
    pub cloud_provider: Option<String>,
    pub primary_persona: Option<String>,
    pub meeting_notes: Option<String>,
    pub technical_requirements: Option<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    pub competitor_landscape: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_won_stage_round_trips_with_space() {
        let stage: DealStage = serde_json::from_str("\"Closed Won\"").unwrap();
        assert_eq!(stage, DealStage::ClosedWon);
        assert_eq!(stage.as_str(), "Closed Won");
    }

    #[test]
    fn test_unknown_stage_rejected() {
        assert!(serde_json::from_str::<DealStage>("\"Closed Lost\"").is_err());
    }

    #[test]
    fn test_patch_leaves_absent_fields() {
        let now = Utc::now();
        let mut deal = Deal {
            id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            amount: 1000.0,
            stage: "Discovery".to_string(),
            close_date: None,
            assigned_ae_id: None,
            industry: Some("Retail".to_string()),
            cloud_provider: None,
            notes: None,
            next_action: None,
            next_action_due_date: None,
            health_flags: vec!["stalled".to_string()],
            hubspot_deal_id: None,
            created_at: now,
            updated_at: now,
        };
        DealPatch {
            stage: Some(DealStage::Proposal),
            amount: Some(2500.0),
            ..Default::default()
        }
        .apply(&mut deal);

        assert_eq!(deal.stage, "Proposal");
        assert_eq!(deal.amount, 2500.0);
        assert_eq!(deal.industry.as_deref(), Some("Retail"));
        assert_eq!(deal.health_flags, vec!["stalled".to_string()]);
    }
}
