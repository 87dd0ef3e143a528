use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::models::asset::Asset;

const TOP_N: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub view_count: i32,
    pub usage_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatorCount {
    pub created_by: Uuid,
    pub asset_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentAnalytics {
    pub total_content: usize,
    pub published_content: usize,
    pub draft_content: usize,
    pub total_views: i64,
    pub by_category: BTreeMap<String, usize>,
    pub top_viewed: Vec<AssetSummary>,
    pub most_used: Vec<AssetSummary>,
    pub unused: Vec<AssetSummary>,
    pub top_creators: Vec<CreatorCount>,
}

/// Library-wide content statistics. `usage` maps asset id to the number of deals it is linked to.
pub fn compute_content_analytics(
    assets: &[Asset],
    usage: &HashMap<Uuid, i64>,
) -> ContentAnalytics {
    let usage_of = |a: &Asset| usage.get(&a.id).copied().unwrap_or(0);
    let summarize = |a: &Asset| AssetSummary {
        id: a.id,
        title: a.title.clone(),
        category: a.category.clone(),
        view_count: a.view_count,
        usage_count: usage_of(a),
    };

    let mut by_category = BTreeMap::new();
    for asset in assets {
        *by_category.entry(asset.category.clone()).or_insert(0) += 1;
    }

    let mut by_views: Vec<&Asset> = assets.iter().collect();
    by_views.sort_by(|a, b| b.view_count.cmp(&a.view_count));

    let mut by_usage: Vec<&Asset> = assets.iter().collect();
    by_usage.sort_by(|a, b| usage_of(*b).cmp(&usage_of(*a)));

    let mut creators: HashMap<Uuid, usize> = HashMap::new();
    for created_by in assets.iter().filter_map(|a| a.created_by) {
        *creators.entry(created_by).or_insert(0) += 1;
    }
    let mut top_creators: Vec<CreatorCount> = creators
        .into_iter()
        .map(|(created_by, asset_count)| CreatorCount {
            created_by,
            asset_count,
        })
        .collect();
    // Ties broken by id so the output is stable across HashMap orderings.
    top_creators.sort_by(|a, b| {
        b.asset_count
            .cmp(&a.asset_count)
            .then_with(|| a.created_by.cmp(&b.created_by))
    });
    top_creators.truncate(TOP_N);

    ContentAnalytics {
        total_content: assets.len(),
        published_content: assets.iter().filter(|a| a.status == "published").count(),
        draft_content: assets.iter().filter(|a| a.status == "draft").count(),
        total_views: assets.iter().map(|a| a.view_count as i64).sum(),
        by_category,
        top_viewed: by_views.into_iter().take(TOP_N).map(summarize).collect(),
        most_used: by_usage.into_iter().take(TOP_N).map(summarize).collect(),
        unused: assets
            .iter()
            .filter(|a| usage_of(*a) == 0)
            .map(summarize)
            .collect(),
        top_creators,
    }
}
