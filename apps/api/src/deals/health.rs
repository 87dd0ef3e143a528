use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthFlag {
    NoActivity,
    MissingEconomicBuyer,
    NoResponseToProposal,
    CompetitivePressure,
    FollowUpOverdue,
    MissingTechnicalChampion,
    Stalled,
    BudgetConcerns,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    AtRisk,
    NeedsAttention,
    Healthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlagDetail {
    pub flag: HealthFlag,
    pub severity: Severity,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthBreakdown {
    pub status: HealthStatus,
    pub critical_count: usize,
    pub warning_count: usize,
    /// Critical flags first, then warnings, each in stored order.
    pub flags: Vec<FlagDetail>,
}

impl HealthFlag {
    pub fn parse(tag: &str) -> Option<HealthFlag> {
        Some(match tag {
            "no_activity" => HealthFlag::NoActivity,
            "missing_economic_buyer" => HealthFlag::MissingEconomicBuyer,
            "no_response_to_proposal" => HealthFlag::NoResponseToProposal,
            "competitive_pressure" => HealthFlag::CompetitivePressure,
            "follow_up_overdue" => HealthFlag::FollowUpOverdue,
            "missing_technical_champion" => HealthFlag::MissingTechnicalChampion,
            "stalled" => HealthFlag::Stalled,
            "budget_concerns" => HealthFlag::BudgetConcerns,
            _ => return None,
        })
    }

    pub fn detail(self) -> FlagDetail {
        let (severity, label, description) = match self {
            HealthFlag::NoActivity => (
                Severity::Critical,
                "No Recent Activity",
                "No engagement in 10+ days",
            ),
            HealthFlag::MissingEconomicBuyer => (
                Severity::Critical,
                "Missing Economic Buyer",
                "No decision maker identified or engaged",
            ),
            HealthFlag::NoResponseToProposal => (
                Severity::Warning,
                "Proposal Sent, No Response",
                "Waiting for feedback on proposal",
            ),
            HealthFlag::CompetitivePressure => (
                Severity::Warning,
                "Competitive Pressure Detected",
                "Customer evaluating alternative solutions",
            ),
            HealthFlag::FollowUpOverdue => (
                Severity::Critical,
                "Follow-up Overdue",
                "Planned follow-up action is past due",
            ),
            HealthFlag::MissingTechnicalChampion => (
                Severity::Warning,
                "No Technical Champion",
                "Need to identify technical stakeholder",
            ),
            HealthFlag::Stalled => (
                Severity::Critical,
                "Deal Stalled",
                "No clear next steps or momentum",
            ),
            HealthFlag::BudgetConcerns => (
                Severity::Warning,
                "Budget Questions",
                "Pricing or budget concerns raised",
            ),
        };
        FlagDetail {
            flag: self,
            severity,
            label,
            description,
        }
    }
}

pub fn health_breakdown(tags: &[String]) -> HealthBreakdown {
    let mut flags: Vec<FlagDetail> = tags
        .iter()
        .filter_map(|tag| {
            let parsed = HealthFlag::parse(tag);
            if parsed.is_none() {
                debug!("Skipping unknown health flag '{tag}'");
            }
            parsed
        })
        .map(HealthFlag::detail)
        .collect();
    // Stable sort keeps stored order within a severity.
    flags.sort_by_key(|f| f.severity);

    let critical_count = flags
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();
    let warning_count = flags.len() - critical_count;

    let status = if critical_count > 0 {
        HealthStatus::AtRisk
    } else if warning_count > 0 {
        HealthStatus::NeedsAttention
    } else {
        HealthStatus::Healthy
    };

    HealthBreakdown {
        status,
        critical_count,
        warning_count,
        flags,
    }
}
