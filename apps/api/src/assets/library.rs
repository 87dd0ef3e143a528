use serde::Deserialize;

use crate::models::asset::Asset;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LibrarySort {
    /// Store order (newest first).
    #[default]
    Default,
    Popular,
    Views,
    Recent,
}

/// Query string for `GET /api/v1/assets`. Every filter is optional and they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryQuery {
    pub category: Option<String>,
    #[serde(rename = "q")]
    pub search: Option<String>,
    pub status: Option<String>,
    pub industry: Option<String>,
    pub persona: Option<String>,
    pub stage: Option<String>,
    pub cloud: Option<String>,
    #[serde(default)]
    pub sort: LibrarySort,
}

fn matches_search(asset: &Asset, needle: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(needle);
    contains(&asset.title)
        || contains(&asset.description)
        || asset.industry_tags.iter().any(|t| contains(t))
        || asset.persona_tags.iter().any(|t| contains(t))
}

fn has_tag(tags: &[String], wanted: &Option<String>) -> bool {
    match wanted.as_deref() {
        Some(w) if !w.is_empty() => tags.iter().any(|t| t == w),
        _ => true,
    }
}

/// Filters and sorts an already-fetched asset list.
pub fn filter_assets(assets: Vec<Asset>, query: &LibraryQuery) -> Vec<Asset> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<Asset> = assets
        .into_iter()
        .filter(|a| match query.category.as_deref() {
            Some(c) if !c.is_empty() && c != "all" => a.category == c,
            _ => true,
        })
        .filter(|a| needle.as_deref().map_or(true, |n| matches_search(a, n)))
        .filter(|a| match query.status.as_deref() {
            Some(s) if !s.is_empty() => a.status == s,
            _ => true,
        })
        .filter(|a| has_tag(&a.industry_tags, &query.industry))
        .filter(|a| has_tag(&a.persona_tags, &query.persona))
        .filter(|a| has_tag(&a.stage_tags, &query.stage))
        .filter(|a| has_tag(&a.cloud_tags, &query.cloud))
        .collect();

    match query.sort {
        LibrarySort::Default => {}
        LibrarySort::Popular | LibrarySort::Views => {
            filtered.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        }
        LibrarySort::Recent => {
            filtered.sort_by(|a, b| {
                let ta = a.last_accessed_at.unwrap_or(a.created_at);
                let tb = b.last_accessed_at.unwrap_or(b.created_at);
                tb.cmp(&ta)
            });
        }
    }

    filtered
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::asset::Asset;

    pub fn asset(title: &str, asset_type: &str, industry: &[&str], cloud: &[&str]) -> Asset {
        let now = Utc::now();
        Asset {
            id: Uuid::new_v4(),
            title: title.to_string(),
            asset_type: asset_type.to_string(),
            category: "other".to_string(),
            description: String::new(),
            url: String::new(),
            industry_tags: industry.iter().map(|s| s.to_string()).collect(),
            persona_tags: Vec::new(),
            stage_tags: Vec::new(),
            cloud_tags: cloud.iter().map(|s| s.to_string()).collect(),
            contact_ae_id: None,
            contact_engineer_id: None,
            external_contacts: Json(Vec::new()),
            status: "published".to_string(),
            view_count: 0,
            last_accessed_at: None,
            when_to_use: None,
            positioning_angle: None,
            created_by: None,
            created_at: now - Duration::days(30),
            updated_at: now,
        }
    }
}
