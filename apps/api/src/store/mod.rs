//! Persistent store seam.
//!
//! Handlers and services only talk to `dyn Store`. Production uses `PgStore`;
//! tests use the in-memory `MemoryStore`. Row construction (ids, timestamps)
//! happens in the caller, so both backends persist exactly what they are given.
//! Linked assets are the exception: their position is assigned by the store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::{DealActivity, DealMilestone, DealTask};
use crate::models::asset::{Asset, AssetVersion};
use crate::models::deal::{Deal, DealContext, DealContextInput};
use crate::models::engagement::{
    AssetComment, AssetFeedback, DealComment, LinkedAsset, Recommendation,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Whether a revision creates the asset row or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Create,
    Edit,
}

/// An asset write plus the metadata for the version row appended alongside it.
#[derive(Debug, Clone)]
pub struct AssetRevision {
    pub asset: Asset,
    pub kind: RevisionKind,
    pub changed_by: Option<Uuid>,
    pub change_notes: String,
}

#[async_trait]
pub trait Store: Send + Sync {
    // ── deals ────────────────────────────────────────────────────────────────
    async fn list_deals(&self) -> Result<Vec<Deal>, AppError>;
    async fn get_deal(&self, id: Uuid) -> Result<Option<Deal>, AppError>;
    async fn update_deal(&self, deal: &Deal) -> Result<Deal, AppError>;
    async fn list_deal_contexts(&self) -> Result<Vec<DealContext>, AppError>;
    async fn get_deal_context(&self, deal_id: Uuid) -> Result<Option<DealContext>, AppError>;
    async fn upsert_deal_context(
        &self,
        deal_id: Uuid,
        input: &DealContextInput,
    ) -> Result<DealContext, AppError>;
    async fn list_deals_using_asset(&self, asset_id: Uuid) -> Result<Vec<Deal>, AppError>;

    // ── assets ───────────────────────────────────────────────────────────────
    /// Newest first. `limit = None` returns every asset.
    async fn list_assets(&self, limit: Option<i64>) -> Result<Vec<Asset>, AppError>;
    async fn list_assets_excluding(&self, id: Uuid, limit: i64) -> Result<Vec<Asset>, AppError>;
    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>, AppError>;
    /// Writes the asset and appends one version row in the same transaction.
    async fn commit_asset_revision(&self, revision: AssetRevision)
        -> Result<AssetVersion, AppError>;
    /// Newest version first.
    async fn list_asset_versions(&self, asset_id: Uuid) -> Result<Vec<AssetVersion>, AppError>;
    async fn record_asset_view(&self, id: Uuid) -> Result<Option<Asset>, AppError>;
    /// Number of deals each asset is linked to. Unlinked assets are absent.
    async fn asset_usage_counts(&self) -> Result<HashMap<Uuid, i64>, AppError>;

    // ── recommendations & linked assets ──────────────────────────────────────
    async fn list_deal_recommendations(
        &self,
        deal_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recommendation>, AppError>;
    async fn list_linked_assets(&self, deal_id: Uuid) -> Result<Vec<LinkedAsset>, AppError>;
    /// Links an asset at the end of the deal's list. `order_index` is one past
    /// the highest existing index (0 for the first link) and is assigned
    /// atomically with the insert.
    async fn append_linked_asset(
        &self,
        deal_id: Uuid,
        asset_id: Uuid,
        linked_by: Option<Uuid>,
    ) -> Result<LinkedAsset, AppError>;
    async fn delete_linked_asset(&self, id: Uuid) -> Result<bool, AppError>;

    // ── activities, milestones & tasks ───────────────────────────────────────
    /// Newest first.
    async fn list_deal_activities(
        &self,
        deal_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<DealActivity>, AppError>;
    /// Most recent activity timestamp per deal. Deals without activity are absent.
    async fn latest_activity_times(&self) -> Result<HashMap<Uuid, DateTime<Utc>>, AppError>;
    /// Incomplete milestones due within `[from, to]`, earliest first.
    async fn list_open_milestones(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DealMilestone>, AppError>;
    /// Newest first. `deal_id = None` returns tasks for every deal.
    async fn list_tasks(&self, deal_id: Option<Uuid>) -> Result<Vec<DealTask>, AppError>;

    // ── comments ─────────────────────────────────────────────────────────────
    async fn list_deal_comments(&self, deal_id: Uuid) -> Result<Vec<DealComment>, AppError>;
    async fn insert_deal_comment(&self, comment: &DealComment) -> Result<DealComment, AppError>;
    async fn mark_deal_comment_synced(&self, id: Uuid, crm_note_id: &str)
        -> Result<(), AppError>;
    async fn list_asset_comments(&self, asset_id: Uuid) -> Result<Vec<AssetComment>, AppError>;
    async fn insert_asset_comment(&self, comment: &AssetComment)
        -> Result<AssetComment, AppError>;

    // ── feedback ─────────────────────────────────────────────────────────────
    async fn get_feedback(
        &self,
        asset_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AssetFeedback>, AppError>;
    async fn put_feedback(&self, feedback: &AssetFeedback) -> Result<(), AppError>;
    async fn delete_feedback(&self, asset_id: Uuid, user_id: Uuid) -> Result<(), AppError>;
}
