//! Asset recommendation policy.
//!
//! `AppState` holds an `Arc<dyn Recommender>`. The default
//! `FixedConfidenceRecommender` assigns constant confidences and does not rank:
//! output order is the order of the candidate pool handed in.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::asset::Asset;
use crate::store::Store;

/// Number of assets fetched for a free-text query.
pub const QUERY_POOL_SIZE: i64 = 10;
/// Number of assets (excluding the reference) considered for "more like this".
pub const SIMILAR_POOL_SIZE: i64 = 10;
pub const SIMILAR_RESULT_LIMIT: usize = 5;

pub const DEFAULT_CONFIDENCE: f64 = 0.92;
pub const SIMILAR_CONFIDENCE: f64 = 0.85;

/// A computed recommendation. Same shape as a stored one, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedAsset {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset: Asset,
    pub reason: String,
    pub confidence_score: f64,
}

impl RecommendedAsset {
    fn new(asset: &Asset, reason: String, confidence_score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: asset.id,
            asset: asset.clone(),
            reason,
            confidence_score,
        }
    }
}

/// Recommendation policy over an already-fetched candidate pool.
pub trait Recommender: Send + Sync {
    fn for_query(&self, query: &str, candidates: &[Asset]) -> Vec<RecommendedAsset>;
    fn more_like_this(&self, reference: &Asset, candidates: &[Asset]) -> Vec<RecommendedAsset>;
    /// Identifies the policy in logs.
    fn backend(&self) -> &'static str;
}

pub struct FixedConfidenceRecommender;

fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().any(|t| b.contains(t))
}

impl Recommender for FixedConfidenceRecommender {
    fn for_query(&self, query: &str, candidates: &[Asset]) -> Vec<RecommendedAsset> {
        let reason = format!("Matches your query: \"{query}\"");
        candidates
            .iter()
            .map(|a| RecommendedAsset::new(a, reason.clone(), DEFAULT_CONFIDENCE))
            .collect()
    }

    fn more_like_this(&self, reference: &Asset, candidates: &[Asset]) -> Vec<RecommendedAsset> {
        candidates
            .iter()
            .filter(|a| a.id != reference.id)
            .filter_map(|a| {
                let same_type = a.asset_type == reference.asset_type;
                let shares_tags = overlaps(&a.industry_tags, &reference.industry_tags)
                    || overlaps(&a.cloud_tags, &reference.cloud_tags);
                if !same_type && !shares_tags {
                    return None;
                }
                let matched = if same_type { "type" } else { "tags" };
                Some(RecommendedAsset::new(
                    a,
                    format!("Similar to {} - matches {matched}", reference.title),
                    SIMILAR_CONFIDENCE,
                ))
            })
            .take(SIMILAR_RESULT_LIMIT)
            .collect()
    }

    fn backend(&self) -> &'static str {
        "fixed_confidence"
    }
}

/// Runs `recommender` over the query pool. Blank queries are rejected.
pub async fn recommend_for_query(
    store: &dyn Store,
    recommender: &dyn Recommender,
    query: &str,
) -> Result<Vec<RecommendedAsset>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    let pool = store.list_assets(Some(QUERY_POOL_SIZE)).await?;
    Ok(recommender.for_query(query, &pool))
}

pub async fn recommend_similar(
    store: &dyn Store,
    recommender: &dyn Recommender,
    asset_id: Uuid,
) -> Result<Vec<RecommendedAsset>, AppError> {
    let reference = store
        .get_asset(asset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;
    let pool = store
        .list_assets_excluding(asset_id, SIMILAR_POOL_SIZE)
        .await?;
    Ok(recommender.more_like_this(&reference, &pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::library::fixtures::asset;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_query_confidence_and_reason() {
        let pool = vec![asset("a", "Demo", &[], &[]), asset("b", "Deck", &[], &[])];
        let recs = FixedConfidenceRecommender.for_query("retail copilot", &pool);
        assert_eq!(recs.len(), 2);
        for r in &recs {
            assert_eq!(r.confidence_score, 0.92);
            assert_eq!(r.reason, "Matches your query: \"retail copilot\"");
        }
        assert_eq!(recs[0].asset_id, pool[0].id);
    }

    #[test]
    fn test_more_like_this_type_or_tags() {
        let reference = asset("Ref", "Demo", &["Retail"], &["AWS"]);
        let pool = vec![
            asset("unrelated", "Deck", &["Banking"], &["GCP"]),
            asset("same type", "Demo", &[], &[]),
            asset("same industry", "Deck", &["Retail"], &[]),
            asset("same cloud", "Video", &[], &["AWS"]),
        ];
        let recs = FixedConfidenceRecommender.more_like_this(&reference, &pool);
        let titles: Vec<&str> = recs.iter().map(|r| r.asset.title.as_str()).collect();
        assert_eq!(titles, vec!["same type", "same industry", "same cloud"]);
        assert_eq!(recs[0].reason, "Similar to Ref - matches type");
        assert_eq!(recs[1].reason, "Similar to Ref - matches tags");
        assert!(recs.iter().all(|r| r.confidence_score == 0.85));
    }

    #[test]
    fn test_more_like_this_excludes_reference_and_caps() {
        let reference = asset("Ref", "Demo", &[], &[]);
        let mut pool: Vec<Asset> = (0..8).map(|i| asset(&format!("d{i}"), "Demo", &[], &[])).collect();
        pool.insert(0, reference.clone());
        let recs = FixedConfidenceRecommender.more_like_this(&reference, &pool);
        assert_eq!(recs.len(), SIMILAR_RESULT_LIMIT);
        assert!(recs.iter().all(|r| r.asset_id != reference.id));
    }

    #[tokio::test]
    async fn test_query_pool_capped_at_ten() {
        let store = MemoryStore::new();
        for i in 0..12 {
            store.seed_asset(asset(&format!("a{i}"), "Demo", &[], &[])).await;
        }
        let recs = recommend_for_query(&store, &FixedConfidenceRecommender, "security review")
            .await
            .unwrap();
        assert_eq!(recs.len(), 10);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_list() {
        let store = MemoryStore::new();
        let recs = recommend_for_query(&store, &FixedConfidenceRecommender, "anything")
            .await
            .unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let store = MemoryStore::new();
        let res = recommend_for_query(&store, &FixedConfidenceRecommender, "  \n").await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_similar_for_only_asset_is_empty() {
        let store = MemoryStore::new();
        let only = asset("Only", "Demo", &[], &[]);
        let id = only.id;
        store.seed_asset(only).await;
        let recs = recommend_similar(&store, &FixedConfidenceRecommender, id)
            .await
            .unwrap();
        assert!(recs.is_empty());
    }
}
