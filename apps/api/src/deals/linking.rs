use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::engagement::LinkedAsset;
use crate::store::Store;

/// Appends `asset_id` to the deal's linked assets. Links are ordered by
/// `order_index`, one past the highest index already present.
pub async fn link_asset(
    store: &dyn Store,
    deal_id: Uuid,
    asset_id: Uuid,
    linked_by: Option<Uuid>,
) -> Result<LinkedAsset, AppError> {
    store
        .get_deal(deal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Deal {deal_id} not found")))?;
    store
        .get_asset(asset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;

    store.append_linked_asset(deal_id, asset_id, linked_by).await
}

/// Links every stored recommendation for the deal that is not linked yet.
/// Returns only the links created by this call.
pub async fn link_recommended_assets(
    store: &dyn Store,
    deal_id: Uuid,
    linked_by: Option<Uuid>,
) -> Result<Vec<LinkedAsset>, AppError> {
    store
        .get_deal(deal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Deal {deal_id} not found")))?;

    let mut linked_ids: Vec<Uuid> = store
        .list_linked_assets(deal_id)
        .await?
        .iter()
        .map(|l| l.asset_id)
        .collect();
    let recommendations = store.list_deal_recommendations(deal_id, None).await?;

    let mut created = Vec::new();
    for rec in recommendations {
        if linked_ids.contains(&rec.asset_id) {
            continue;
        }
        let link = store
            .append_linked_asset(deal_id, rec.asset_id, linked_by)
            .await?;
        linked_ids.push(link.asset_id);
        created.push(link);
    }

    info!("Linked {} recommended assets to deal {deal_id}", created.len());
    Ok(created)
}

pub async fn unlink_asset(store: &dyn Store, link_id: Uuid) -> Result<(), AppError> {
    if !store.delete_linked_asset(link_id).await? {
        return Err(AppError::NotFound(format!("Linked asset {link_id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::assets::library::fixtures::asset;
    use crate::deals::completeness::fixtures::deal;
    use crate::models::engagement::Recommendation;
    use crate::store::memory::MemoryStore;

    async fn seeded() -> (MemoryStore, Uuid, Vec<Uuid>) {
        let store = MemoryStore::new();
        let d = deal("Acme");
        let deal_id = d.id;
        store.seed_deal(d).await;
        let mut asset_ids = Vec::new();
        for i in 0..3 {
            let a = asset(&format!("a{i}"), "Demo", &[], &[]);
            asset_ids.push(a.id);
            store.seed_asset(a).await;
        }
        (store, deal_id, asset_ids)
    }

    fn rec(deal_id: Uuid, asset_id: Uuid, confidence_score: f64) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            deal_id,
            asset_id,
            reason: "Industry match".to_string(),
            confidence_score,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_order_index_follows_link_count() {
        let (store, deal_id, assets) = seeded().await;
        let first = link_asset(&store, deal_id, assets[0], None).await.unwrap();
        let second = link_asset(&store, deal_id, assets[1], None).await.unwrap();
        assert_eq!(first.order_index, 0);
        assert_eq!(second.order_index, 1);
    }

    #[tokio::test]
    async fn test_order_index_after_unlink_does_not_collide() {
        let (store, deal_id, assets) = seeded().await;
        let first = link_asset(&store, deal_id, assets[0], None).await.unwrap();
        link_asset(&store, deal_id, assets[1], None).await.unwrap();
        unlink_asset(&store, first.id).await.unwrap();

        let third = link_asset(&store, deal_id, assets[2], None).await.unwrap();
        assert_eq!(third.order_index, 2);
    }

    #[tokio::test]
    async fn test_concurrent_links_get_distinct_indexes() {
        let (store, deal_id, assets) = seeded().await;
        let (a, b, c) = tokio::join!(
            link_asset(&store, deal_id, assets[0], None),
            link_asset(&store, deal_id, assets[1], None),
            link_asset(&store, deal_id, assets[2], None),
        );
        let mut indexes = vec![
            a.unwrap().order_index,
            b.unwrap().order_index,
            c.unwrap().order_index,
        ];
        indexes.sort();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_link_unknown_asset() {
        let (store, deal_id, _) = seeded().await;
        let res = link_asset(&store, deal_id, Uuid::new_v4(), None).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_link_all_skips_already_linked() {
        let (store, deal_id, assets) = seeded().await;
        link_asset(&store, deal_id, assets[1], None).await.unwrap();
        for (i, id) in assets.iter().enumerate() {
            store.seed_recommendation(rec(deal_id, *id, 0.5 + i as f64 / 10.0)).await;
        }

        let created = link_recommended_assets(&store, deal_id, None).await.unwrap();
        assert_eq!(created.len(), 2);
        // Highest confidence first: a2 then a0.
        assert_eq!(created[0].asset_id, assets[2]);
        assert_eq!(created[0].order_index, 1);
        assert_eq!(created[1].asset_id, assets[0]);
        assert_eq!(created[1].order_index, 2);

        let again = link_recommended_assets(&store, deal_id, None).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(store.list_linked_assets(deal_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unlink() {
        let (store, deal_id, assets) = seeded().await;
        let link = link_asset(&store, deal_id, assets[0], None).await.unwrap();
        unlink_asset(&store, link.id).await.unwrap();
        assert!(store.list_linked_assets(deal_id).await.unwrap().is_empty());
        assert!(matches!(
            unlink_asset(&store, link.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
