//! In-memory `Store` used by service-level tests.
//!
//! Vectors keep insertion order; "newest first" queries iterate in reverse.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assets::versioning::{next_version_number, snapshot_version};
use crate::errors::AppError;
use crate::models::activity::{DealActivity, DealMilestone, DealTask};
use crate::models::asset::{Asset, AssetVersion};
use crate::models::deal::{Deal, DealContext, DealContextInput};
use crate::models::engagement::{
    AssetComment, AssetFeedback, DealComment, LinkedAsset, Recommendation,
};
use crate::store::{AssetRevision, RevisionKind, Store};

#[derive(Default)]
struct Tables {
    deals: Vec<Deal>,
    contexts: Vec<DealContext>,
    assets: Vec<Asset>,
    versions: Vec<AssetVersion>,
    recommendations: Vec<Recommendation>,
    linked: Vec<LinkedAsset>,
    deal_comments: Vec<DealComment>,
    asset_comments: Vec<AssetComment>,
    feedback: Vec<AssetFeedback>,
    activities: Vec<DealActivity>,
    milestones: Vec<DealMilestone>,
    tasks: Vec<DealTask>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_mark_synced: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_deal(&self, deal: Deal) {
        self.tables.write().await.deals.push(deal);
    }

    pub async fn seed_asset(&self, asset: Asset) {
        self.tables.write().await.assets.push(asset);
    }

    pub async fn seed_recommendation(&self, rec: Recommendation) {
        self.tables.write().await.recommendations.push(rec);
    }

    pub async fn seed_activity(&self, activity: DealActivity) {
        self.tables.write().await.activities.push(activity);
    }

    pub async fn seed_milestone(&self, milestone: DealMilestone) {
        self.tables.write().await.milestones.push(milestone);
    }

    pub async fn seed_task(&self, task: DealTask) {
        self.tables.write().await.tasks.push(task);
    }

    /// Makes every later `mark_deal_comment_synced` call fail.
    pub fn fail_mark_synced(&self) {
        self.fail_mark_synced.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_deals(&self) -> Result<Vec<Deal>, AppError> {
        Ok(self.tables.read().await.deals.iter().rev().cloned().collect())
    }

    async fn get_deal(&self, id: Uuid) -> Result<Option<Deal>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .deals
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn update_deal(&self, deal: &Deal) -> Result<Deal, AppError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .deals
            .iter_mut()
            .find(|d| d.id == deal.id)
            .ok_or_else(|| AppError::NotFound(format!("Deal {} not found", deal.id)))?;
        *slot = deal.clone();
        Ok(slot.clone())
    }

    async fn list_deal_contexts(&self) -> Result<Vec<DealContext>, AppError> {
        Ok(self.tables.read().await.contexts.clone())
    }

    async fn get_deal_context(&self, deal_id: Uuid) -> Result<Option<DealContext>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .contexts
            .iter()
            .find(|c| c.deal_id == deal_id)
            .cloned())
    }

    async fn upsert_deal_context(
        &self,
        deal_id: Uuid,
        input: &DealContextInput,
    ) -> Result<DealContext, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let existing = tables.contexts.iter().position(|c| c.deal_id == deal_id);
        let (id, created_at) = match existing {
            Some(i) => (tables.contexts[i].id, tables.contexts[i].created_at),
            None => (Uuid::new_v4(), now),
        };
        let context = DealContext {
            id,
            deal_id,
            description: input.description.clone(),
            primary_use_case: input.primary_use_case.clone(),
            cloud_provider: input.cloud_provider.clone(),
            primary_persona: input.primary_persona.clone(),
            meeting_notes: input.meeting_notes.clone(),
            technical_requirements: input.technical_requirements.clone(),
            pain_points: input.pain_points.clone(),
            competitor_landscape: input.competitor_landscape.clone(),
            created_at,
            updated_at: now,
        };
        match existing {
            Some(i) => tables.contexts[i] = context.clone(),
            None => tables.contexts.push(context.clone()),
        }
        Ok(context)
    }

    async fn list_deals_using_asset(&self, asset_id: Uuid) -> Result<Vec<Deal>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .deals
            .iter()
            .rev()
            .filter(|d| {
                tables
                    .linked
                    .iter()
                    .any(|l| l.asset_id == asset_id && l.deal_id == d.id)
            })
            .cloned()
            .collect())
    }

    async fn list_assets(&self, limit: Option<i64>) -> Result<Vec<Asset>, AppError> {
        let tables = self.tables.read().await;
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(tables.assets.iter().rev().take(limit).cloned().collect())
    }

    async fn list_assets_excluding(&self, id: Uuid, limit: i64) -> Result<Vec<Asset>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .iter()
            .rev()
            .filter(|a| a.id != id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .assets
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn commit_asset_revision(
        &self,
        revision: AssetRevision,
    ) -> Result<AssetVersion, AppError> {
        let mut tables = self.tables.write().await;
        let AssetRevision {
            asset,
            kind,
            changed_by,
            change_notes,
        } = revision;

        match kind {
            RevisionKind::Create => tables.assets.push(asset.clone()),
            RevisionKind::Edit => {
                let slot = tables
                    .assets
                    .iter_mut()
                    .find(|a| a.id == asset.id)
                    .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", asset.id)))?;
                *slot = asset.clone();
            }
        }

        let current_max = tables
            .versions
            .iter()
            .filter(|v| v.asset_id == asset.id)
            .map(|v| v.version_number)
            .max();
        let version = snapshot_version(
            &asset,
            next_version_number(current_max),
            changed_by,
            change_notes,
        );
        tables.versions.push(version.clone());
        Ok(version)
    }

    async fn list_asset_versions(&self, asset_id: Uuid) -> Result<Vec<AssetVersion>, AppError> {
        let mut versions: Vec<_> = self
            .tables
            .read()
            .await
            .versions
            .iter()
            .filter(|v| v.asset_id == asset_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn record_asset_view(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.assets.iter_mut().find(|a| a.id == id).map(|a| {
            a.view_count += 1;
            a.last_accessed_at = Some(Utc::now());
            a.clone()
        }))
    }

    async fn asset_usage_counts(&self) -> Result<HashMap<Uuid, i64>, AppError> {
        let mut counts = HashMap::new();
        for link in &self.tables.read().await.linked {
            *counts.entry(link.asset_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_deal_recommendations(
        &self,
        deal_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recommendation>, AppError> {
        let mut recs: Vec<_> = self
            .tables
            .read()
            .await
            .recommendations
            .iter()
            .filter(|r| r.deal_id == deal_id)
            .cloned()
            .collect();
        recs.sort_by(|a, b| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(limit) = limit {
            recs.truncate(limit.max(0) as usize);
        }
        Ok(recs)
    }

    async fn list_linked_assets(&self, deal_id: Uuid) -> Result<Vec<LinkedAsset>, AppError> {
        let mut links: Vec<_> = self
            .tables
            .read()
            .await
            .linked
            .iter()
            .filter(|l| l.deal_id == deal_id)
            .cloned()
            .collect();
        links.sort_by_key(|l| l.order_index);
        Ok(links)
    }

    async fn append_linked_asset(
        &self,
        deal_id: Uuid,
        asset_id: Uuid,
        linked_by: Option<Uuid>,
    ) -> Result<LinkedAsset, AppError> {
        let mut tables = self.tables.write().await;
        let order_index = tables
            .linked
            .iter()
            .filter(|l| l.deal_id == deal_id)
            .map(|l| l.order_index + 1)
            .max()
            .unwrap_or(0);
        let link = LinkedAsset {
            id: Uuid::new_v4(),
            deal_id,
            asset_id,
            linked_by,
            order_index,
            created_at: Utc::now(),
        };
        tables.linked.push(link.clone());
        Ok(link)
    }

    async fn delete_linked_asset(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.linked.len();
        tables.linked.retain(|l| l.id != id);
        Ok(tables.linked.len() < before)
    }

    async fn list_deal_activities(
        &self,
        deal_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<DealActivity>, AppError> {
        let mut activities: Vec<_> = self
            .tables
            .read()
            .await
            .activities
            .iter()
            .filter(|a| a.deal_id == deal_id)
            .cloned()
            .collect();
        activities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            activities.truncate(limit.max(0) as usize);
        }
        Ok(activities)
    }

    async fn latest_activity_times(&self) -> Result<HashMap<Uuid, DateTime<Utc>>, AppError> {
        let mut latest: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        for a in &self.tables.read().await.activities {
            let entry = latest.entry(a.deal_id).or_insert(a.created_at);
            if a.created_at > *entry {
                *entry = a.created_at;
            }
        }
        Ok(latest)
    }

    async fn list_open_milestones(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DealMilestone>, AppError> {
        let mut milestones: Vec<_> = self
            .tables
            .read()
            .await
            .milestones
            .iter()
            .filter(|m| !m.completed && m.due_date >= from && m.due_date <= to)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.due_date);
        Ok(milestones)
    }

    async fn list_tasks(&self, deal_id: Option<Uuid>) -> Result<Vec<DealTask>, AppError> {
        let mut tasks: Vec<_> = self
            .tables
            .read()
            .await
            .tasks
            .iter()
            .filter(|t| deal_id.map_or(true, |id| t.deal_id == id))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn list_deal_comments(&self, deal_id: Uuid) -> Result<Vec<DealComment>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .deal_comments
            .iter()
            .rev()
            .filter(|c| c.deal_id == deal_id)
            .cloned()
            .collect())
    }

    async fn insert_deal_comment(&self, comment: &DealComment) -> Result<DealComment, AppError> {
        self.tables.write().await.deal_comments.push(comment.clone());
        Ok(comment.clone())
    }

    async fn mark_deal_comment_synced(
        &self,
        id: Uuid,
        crm_note_id: &str,
    ) -> Result<(), AppError> {
        if self.fail_mark_synced.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("connection reset")));
        }
        let mut tables = self.tables.write().await;
        if let Some(c) = tables.deal_comments.iter_mut().find(|c| c.id == id) {
            c.synced_to_crm = true;
            c.crm_note_id = Some(crm_note_id.to_string());
        }
        Ok(())
    }

    async fn list_asset_comments(&self, asset_id: Uuid) -> Result<Vec<AssetComment>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .asset_comments
            .iter()
            .rev()
            .filter(|c| c.asset_id == asset_id)
            .cloned()
            .collect())
    }

    async fn insert_asset_comment(
        &self,
        comment: &AssetComment,
    ) -> Result<AssetComment, AppError> {
        self.tables.write().await.asset_comments.push(comment.clone());
        Ok(comment.clone())
    }

    async fn get_feedback(
        &self,
        asset_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AssetFeedback>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .feedback
            .iter()
            .find(|f| f.asset_id == asset_id && f.user_id == user_id)
            .cloned())
    }

    async fn put_feedback(&self, feedback: &AssetFeedback) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .feedback
            .iter()
            .position(|f| f.asset_id == feedback.asset_id && f.user_id == feedback.user_id);
        match existing {
            Some(i) => tables.feedback[i].vote = feedback.vote.clone(),
            None => tables.feedback.push(feedback.clone()),
        }
        Ok(())
    }

    async fn delete_feedback(&self, asset_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .feedback
            .retain(|f| !(f.asset_id == asset_id && f.user_id == user_id));
        Ok(())
    }
}
