use serde::{Deserialize, Serialize};

use crate::models::deal::{Deal, DealContext};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessTier {
    Complete,
    Partial,
    Sparse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// 0 – 100
    pub score: u32,
    pub tier: CompletenessTier,
    pub missing_fields: Vec<String>,
}

/// Presence weights. They sum to 100.
const FIELD_WEIGHTS: &[(&str, u32)] = &[
    ("company_name", 5),
    ("amount", 5),
    ("close_date", 5),
    ("industry", 10),
    ("description", 15),
    ("primary_use_case", 15),
    ("cloud_provider", 10),
    ("primary_persona", 10),
    ("meeting_notes", 15),
    ("technical_requirements", 5),
    ("pain_points", 5),
];

/// Any non-empty string counts, whitespace included.
fn present(value: Option<&str>) -> bool {
    value.map(|v| !v.is_empty()).unwrap_or(false)
}

fn field_present(field: &str, deal: &Deal, context: Option<&DealContext>) -> bool {
    match field {
        "company_name" => present(Some(&deal.company_name)),
        "amount" => deal.amount > 0.0,
        "close_date" => deal.close_date.is_some(),
        "industry" => present(deal.industry.as_deref()),
        // A deal without a context row scores zero on every context field.
        "description" => present(context.and_then(|c| c.description.as_deref())),
        "primary_use_case" => present(context.and_then(|c| c.primary_use_case.as_deref())),
        "cloud_provider" => present(context.and_then(|c| c.cloud_provider.as_deref())),
        "primary_persona" => present(context.and_then(|c| c.primary_persona.as_deref())),
        "meeting_notes" => present(context.and_then(|c| c.meeting_notes.as_deref())),
        "technical_requirements" => {
            present(context.and_then(|c| c.technical_requirements.as_deref()))
        }
        "pain_points" => context.map(|c| !c.pain_points.is_empty()).unwrap_or(false),
        _ => false,
    }
}

pub fn tier_for(score: u32) -> CompletenessTier {
    match score {
        s if s >= 75 => CompletenessTier::Complete,
        s if s >= 50 => CompletenessTier::Partial,
        _ => CompletenessTier::Sparse,
    }
}

pub fn compute_completeness(deal: &Deal, context: Option<&DealContext>) -> CompletenessReport {
    let mut earned = 0u32;
    let mut missing_fields = Vec::new();

    for (field, weight) in FIELD_WEIGHTS {
        if field_present(field, deal, context) {
            earned += weight;
        } else {
            missing_fields.push(field.to_string());
        }
    }

    let total: u32 = FIELD_WEIGHTS.iter().map(|(_, w)| w).sum();
    let score = if total > 0 {
        ((earned as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    CompletenessReport {
        score,
        tier: tier_for(score),
        missing_fields,
    }
}
