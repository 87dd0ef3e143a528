use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalContact {
    pub name: String,
    pub email: String,
    pub company: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub asset_type: String,
    pub category: String,
    pub description: String,
    pub url: String,
    pub industry_tags: Vec<String>,
    pub persona_tags: Vec<String>,
    pub stage_tags: Vec<String>,
    pub cloud_tags: Vec<String>,
    pub contact_ae_id: Option<Uuid>,
    pub contact_engineer_id: Option<Uuid>,
    pub external_contacts: Json<Vec<ExternalContact>>,
    pub status: String,
    pub view_count: i32,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub when_to_use: Option<String>,
    pub positioning_angle: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the append-only asset history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetVersion {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub version_number: i32,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub industry_tags: Vec<String>,
    pub persona_tags: Vec<String>,
    pub stage_tags: Vec<String>,
    pub cloud_tags: Vec<String>,
    pub contact_ae_id: Option<Uuid>,
    pub contact_engineer_id: Option<Uuid>,
    pub external_contacts: Json<Vec<ExternalContact>>,
    pub status: String,
    pub changed_by: Option<Uuid>,
    pub change_notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    ConceptDemo,
    CaseStudy,
    Testimonial,
    OnePager,
    Video,
    Tutorial,
    SalesPlay,
    Proof,
    Deck,
    Blueprint,
    #[default]
    Other,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::ConceptDemo => "concept_demo",
            AssetCategory::CaseStudy => "case_study",
            AssetCategory::Testimonial => "testimonial",
            AssetCategory::OnePager => "one_pager",
            AssetCategory::Video => "video",
            AssetCategory::Tutorial => "tutorial",
            AssetCategory::SalesPlay => "sales_play",
            AssetCategory::Proof => "proof",
            AssetCategory::Deck => "deck",
            AssetCategory::Blueprint => "blueprint",
            AssetCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Draft => "draft",
            AssetStatus::Published => "published",
            AssetStatus::Archived => "archived",
        }
    }
}

/// The editable fields of an asset, shared by create and edit.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetInput {
    pub title: String,
    #[serde(rename = "type", default = "default_asset_type")]
    pub asset_type: String,
    #[serde(default)]
    pub category: AssetCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub industry_tags: Vec<String>,
    #[serde(default)]
    pub persona_tags: Vec<String>,
    #[serde(default)]
    pub stage_tags: Vec<String>,
    #[serde(default)]
    pub cloud_tags: Vec<String>,
    pub contact_ae_id: Option<Uuid>,
    pub contact_engineer_id: Option<Uuid>,
    #[serde(default)]
    pub external_contacts: Vec<ExternalContact>,
    #[serde(default)]
    pub status: AssetStatus,
    pub when_to_use: Option<String>,
    pub positioning_angle: Option<String>,
}

fn default_asset_type() -> String {
    "Demo".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    #[serde(flatten)]
    pub input: AssetInput,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetEdit {
    #[serde(flatten)]
    pub input: AssetInput,
    /// Forces the saved status to `draft` regardless of `status`.
    #[serde(default)]
    pub save_as_draft: bool,
    pub changed_by: Option<Uuid>,
    #[serde(default)]
    pub change_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_input_defaults() {
        let input: AssetInput = serde_json::from_str(r#"{"title": "Retail demo"}"#).unwrap();
        assert_eq!(input.asset_type, "Demo");
        assert_eq!(input.category, AssetCategory::Other);
        assert_eq!(input.status, AssetStatus::Draft);
        assert!(input.industry_tags.is_empty());
    }

    #[test]
    fn test_asset_edit_flattens_input() {
        let edit: AssetEdit = serde_json::from_str(
            r#"{"title": "Deck", "type": "Deck", "category": "one_pager",
                "status": "published", "save_as_draft": true, "change_notes": "typo"}"#,
        )
        .unwrap();
        assert_eq!(edit.input.asset_type, "Deck");
        assert_eq!(edit.input.category, AssetCategory::OnePager);
        assert!(edit.save_as_draft);
        assert_eq!(edit.change_notes, "typo");
    }

    #[test]
    fn test_unknown_category_rejected() {
        let res = serde_json::from_str::<AssetInput>(r#"{"title": "x", "category": "podcast"}"#);
        assert!(res.is_err());
    }
}
