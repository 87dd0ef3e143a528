use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;
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

/// Postgres-backed store. Schema: `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_deals(&self) -> Result<Vec<Deal>, AppError> {
        Ok(
            sqlx::query_as::<_, Deal>("SELECT * FROM deals ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_deal(&self, id: Uuid) -> Result<Option<Deal>, AppError> {
        Ok(sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_deal(&self, deal: &Deal) -> Result<Deal, AppError> {
        Ok(sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals
            SET stage = $2, amount = $3, close_date = $4, industry = $5,
                cloud_provider = $6, notes = $7, next_action = $8,
                next_action_due_date = $9, health_flags = $10, updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(deal.id)
        .bind(&deal.stage)
        .bind(deal.amount)
        .bind(deal.close_date)
        .bind(&deal.industry)
        .bind(&deal.cloud_provider)
        .bind(&deal.notes)
        .bind(&deal.next_action)
        .bind(deal.next_action_due_date)
        .bind(&deal.health_flags)
        .bind(deal.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_deal_contexts(&self) -> Result<Vec<DealContext>, AppError> {
        Ok(sqlx::query_as::<_, DealContext>("SELECT * FROM deal_context")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_deal_context(&self, deal_id: Uuid) -> Result<Option<DealContext>, AppError> {
        Ok(
            sqlx::query_as::<_, DealContext>("SELECT * FROM deal_context WHERE deal_id = $1")
                .bind(deal_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_deal_context(
        &self,
        deal_id: Uuid,
        input: &DealContextInput,
    ) -> Result<DealContext, AppError> {
        Ok(sqlx::query_as::<_, DealContext>(
            r#"
            INSERT INTO deal_context
                (id, deal_id, description, primary_use_case, cloud_provider, primary_persona,
                 meeting_notes, technical_requirements, pain_points, competitor_landscape)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (deal_id) DO UPDATE SET
                description = EXCLUDED.description,
                primary_use_case = EXCLUDED.primary_use_case,
                cloud_provider = EXCLUDED.cloud_provider,
                primary_persona = EXCLUDED.primary_persona,
                meeting_notes = EXCLUDED.meeting_notes,
                technical_requirements = EXCLUDED.technical_requirements,
                pain_points = EXCLUDED.pain_points,
                competitor_landscape = EXCLUDED.competitor_landscape,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(deal_id)
        .bind(&input.description)
        .bind(&input.primary_use_case)
        .bind(&input.cloud_provider)
        .bind(&input.primary_persona)
        .bind(&input.meeting_notes)
        .bind(&input.technical_requirements)
        .bind(&input.pain_points)
        .bind(&input.competitor_landscape)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_deals_using_asset(&self, asset_id: Uuid) -> Result<Vec<Deal>, AppError> {
        Ok(sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE id IN (SELECT deal_id FROM linked_assets WHERE asset_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_assets(&self, limit: Option<i64>) -> Result<Vec<Asset>, AppError> {
        // LIMIT NULL is LIMIT ALL in Postgres.
        Ok(sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_assets_excluding(&self, id: Uuid, limit: i64) -> Result<Vec<Asset>, AppError> {
        Ok(sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id <> $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        Ok(sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn commit_asset_revision(
        &self,
        revision: AssetRevision,
    ) -> Result<AssetVersion, AppError> {
        let AssetRevision {
            asset,
            kind,
            changed_by,
            change_notes,
        } = revision;

        let mut tx = self.pool.begin().await?;

        match kind {
            RevisionKind::Create => {
                sqlx::query(
                    r#"
                    INSERT INTO assets
                        (id, title, type, category, description, url, industry_tags,
                         persona_tags, stage_tags, cloud_tags, contact_ae_id,
                         contact_engineer_id, external_contacts, status, view_count,
                         last_accessed_at, when_to_use, positioning_angle, created_by,
                         created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                            $15, $16, $17, $18, $19, $20, $21)
                    "#,
                )
                .bind(asset.id)
                .bind(&asset.title)
                .bind(&asset.asset_type)
                .bind(&asset.category)
                .bind(&asset.description)
                .bind(&asset.url)
                .bind(&asset.industry_tags)
                .bind(&asset.persona_tags)
                .bind(&asset.stage_tags)
                .bind(&asset.cloud_tags)
                .bind(asset.contact_ae_id)
                .bind(asset.contact_engineer_id)
                .bind(&asset.external_contacts)
                .bind(&asset.status)
                .bind(asset.view_count)
                .bind(asset.last_accessed_at)
                .bind(&asset.when_to_use)
                .bind(&asset.positioning_angle)
                .bind(asset.created_by)
                .bind(asset.created_at)
                .bind(asset.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            RevisionKind::Edit => {
                // The row lock taken here serialises concurrent edits of one asset,
                // so the MAX(version_number) read below cannot race.
                let updated = sqlx::query(
                    r#"
                    UPDATE assets
                    SET title = $2, type = $3, category = $4, description = $5, url = $6,
                        industry_tags = $7, persona_tags = $8, stage_tags = $9,
                        cloud_tags = $10, contact_ae_id = $11, contact_engineer_id = $12,
                        external_contacts = $13, status = $14, when_to_use = $15,
                        positioning_angle = $16, updated_at = $17
                    WHERE id = $1
                    "#,
                )
                .bind(asset.id)
                .bind(&asset.title)
                .bind(&asset.asset_type)
                .bind(&asset.category)
                .bind(&asset.description)
                .bind(&asset.url)
                .bind(&asset.industry_tags)
                .bind(&asset.persona_tags)
                .bind(&asset.stage_tags)
                .bind(&asset.cloud_tags)
                .bind(asset.contact_ae_id)
                .bind(asset.contact_engineer_id)
                .bind(&asset.external_contacts)
                .bind(&asset.status)
                .bind(&asset.when_to_use)
                .bind(&asset.positioning_angle)
                .bind(asset.updated_at)
                .execute(&mut *tx)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("Asset {} not found", asset.id)));
                }
            }
        }

        let current_max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(version_number) FROM asset_versions WHERE asset_id = $1")
                .bind(asset.id)
                .fetch_one(&mut *tx)
                .await?;
        let version = snapshot_version(
            &asset,
            next_version_number(current_max),
            changed_by,
            change_notes,
        );

        // Append-only: versions are only ever INSERTed.
        sqlx::query(
            r#"
            INSERT INTO asset_versions
                (id, asset_id, version_number, title, description, url, category,
                 industry_tags, persona_tags, stage_tags, cloud_tags, contact_ae_id,
                 contact_engineer_id, external_contacts, status, changed_by, change_notes,
                 created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18)
            "#,
        )
        .bind(version.id)
        .bind(version.asset_id)
        .bind(version.version_number)
        .bind(&version.title)
        .bind(&version.description)
        .bind(&version.url)
        .bind(&version.category)
        .bind(&version.industry_tags)
        .bind(&version.persona_tags)
        .bind(&version.stage_tags)
        .bind(&version.cloud_tags)
        .bind(version.contact_ae_id)
        .bind(version.contact_engineer_id)
        .bind(&version.external_contacts)
        .bind(&version.status)
        .bind(version.changed_by)
        .bind(&version.change_notes)
        .bind(version.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Committed asset {} version {}",
            version.asset_id, version.version_number
        );
        Ok(version)
    }

    async fn list_asset_versions(&self, asset_id: Uuid) -> Result<Vec<AssetVersion>, AppError> {
        Ok(sqlx::query_as::<_, AssetVersion>(
            "SELECT * FROM asset_versions WHERE asset_id = $1 ORDER BY version_number DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn record_asset_view(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        Ok(sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET view_count = view_count + 1, last_accessed_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn asset_usage_counts(&self) -> Result<HashMap<Uuid, i64>, AppError> {
        let rows: Vec<(Uuid, i64)> =
            sqlx::query_as("SELECT asset_id, COUNT(*) FROM linked_assets GROUP BY asset_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn list_deal_recommendations(
        &self,
        deal_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recommendation>, AppError> {
        Ok(sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT * FROM recommendations
            WHERE deal_id = $1
            ORDER BY confidence_score DESC
            LIMIT $2
            "#,
        )
        .bind(deal_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_linked_assets(&self, deal_id: Uuid) -> Result<Vec<LinkedAsset>, AppError> {
        Ok(sqlx::query_as::<_, LinkedAsset>(
            "SELECT * FROM linked_assets WHERE deal_id = $1 ORDER BY order_index ASC",
        )
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_linked_asset(
        &self,
        deal_id: Uuid,
        asset_id: Uuid,
        linked_by: Option<Uuid>,
    ) -> Result<LinkedAsset, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent appends to the same deal.
        sqlx::query("SELECT id FROM deals WHERE id = $1 FOR UPDATE")
            .bind(deal_id)
            .execute(&mut *tx)
            .await?;

        let link = sqlx::query_as::<_, LinkedAsset>(
            r#"
            INSERT INTO linked_assets (id, deal_id, asset_id, linked_by, order_index, created_at)
            SELECT $1, $2, $3, $4, COALESCE(MAX(order_index) + 1, 0), now()
            FROM linked_assets WHERE deal_id = $2
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(deal_id)
        .bind(asset_id)
        .bind(linked_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(link)
    }

    async fn delete_linked_asset(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM linked_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_deal_activities(
        &self,
        deal_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<DealActivity>, AppError> {
        Ok(sqlx::query_as::<_, DealActivity>(
            r#"
            SELECT * FROM deal_activities
            WHERE deal_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(deal_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn latest_activity_times(&self) -> Result<HashMap<Uuid, DateTime<Utc>>, AppError> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            "SELECT deal_id, MAX(created_at) FROM deal_activities GROUP BY deal_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn list_open_milestones(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DealMilestone>, AppError> {
        Ok(sqlx::query_as::<_, DealMilestone>(
            r#"
            SELECT * FROM deal_milestones
            WHERE NOT completed AND due_date BETWEEN $1 AND $2
            ORDER BY due_date ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_tasks(&self, deal_id: Option<Uuid>) -> Result<Vec<DealTask>, AppError> {
        Ok(sqlx::query_as::<_, DealTask>(
            r#"
            SELECT * FROM deal_tasks
            WHERE $1::uuid IS NULL OR deal_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_deal_comments(&self, deal_id: Uuid) -> Result<Vec<DealComment>, AppError> {
        Ok(sqlx::query_as::<_, DealComment>(
            "SELECT * FROM deal_comments WHERE deal_id = $1 ORDER BY created_at DESC",
        )
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_deal_comment(&self, comment: &DealComment) -> Result<DealComment, AppError> {
        Ok(sqlx::query_as::<_, DealComment>(
            r#"
            INSERT INTO deal_comments
                (id, deal_id, user_id, comment_text, synced_to_crm, crm_note_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(comment.id)
        .bind(comment.deal_id)
        .bind(comment.user_id)
        .bind(&comment.comment_text)
        .bind(comment.synced_to_crm)
        .bind(&comment.crm_note_id)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn mark_deal_comment_synced(
        &self,
        id: Uuid,
        crm_note_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE deal_comments SET synced_to_crm = true, crm_note_id = $2 WHERE id = $1")
            .bind(id)
            .bind(crm_note_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_asset_comments(&self, asset_id: Uuid) -> Result<Vec<AssetComment>, AppError> {
        Ok(sqlx::query_as::<_, AssetComment>(
            "SELECT * FROM asset_comments WHERE asset_id = $1 ORDER BY created_at DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_asset_comment(
        &self,
        comment: &AssetComment,
    ) -> Result<AssetComment, AppError> {
        Ok(sqlx::query_as::<_, AssetComment>(
            r#"
            INSERT INTO asset_comments (id, asset_id, user_id, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(comment.id)
        .bind(comment.asset_id)
        .bind(comment.user_id)
        .bind(&comment.comment)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_feedback(
        &self,
        asset_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AssetFeedback>, AppError> {
        Ok(sqlx::query_as::<_, AssetFeedback>(
            "SELECT * FROM asset_feedback WHERE asset_id = $1 AND user_id = $2",
        )
        .bind(asset_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn put_feedback(&self, feedback: &AssetFeedback) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO asset_feedback (id, asset_id, user_id, vote, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (asset_id, user_id) DO UPDATE SET vote = EXCLUDED.vote
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.asset_id)
        .bind(feedback.user_id)
        .bind(&feedback.vote)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_feedback(&self, asset_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM asset_feedback WHERE asset_id = $1 AND user_id = $2")
            .bind(asset_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
