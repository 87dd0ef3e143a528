use chrono::Utc;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::asset::{Asset, AssetEdit, AssetInput, AssetStatus, AssetVersion, NewAsset};
use crate::store::{AssetRevision, RevisionKind, Store};

/// Version numbers start at 1 and increase by exactly one per revision.
pub fn next_version_number(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// Builds the history row for `asset` as it stands after a revision.
pub fn snapshot_version(
    asset: &Asset,
    version_number: i32,
    changed_by: Option<Uuid>,
    change_notes: String,
) -> AssetVersion {
    AssetVersion {
        id: Uuid::new_v4(),
        asset_id: asset.id,
        version_number,
        title: asset.title.clone(),
        description: asset.description.clone(),
        url: asset.url.clone(),
        category: asset.category.clone(),
        industry_tags: asset.industry_tags.clone(),
        persona_tags: asset.persona_tags.clone(),
        stage_tags: asset.stage_tags.clone(),
        cloud_tags: asset.cloud_tags.clone(),
        contact_ae_id: asset.contact_ae_id,
        contact_engineer_id: asset.contact_engineer_id,
        external_contacts: asset.external_contacts.clone(),
        status: asset.status.clone(),
        changed_by,
        change_notes,
        created_at: Utc::now(),
    }
}

/// Copies the editable fields of `input` onto `asset`.
fn apply_input(asset: &mut Asset, input: AssetInput, status: AssetStatus) {
    asset.title = input.title;
    asset.asset_type = input.asset_type;
    asset.category = input.category.as_str().to_string();
    asset.description = input.description;
    asset.url = input.url;
    asset.industry_tags = input.industry_tags;
    asset.persona_tags = input.persona_tags;
    asset.stage_tags = input.stage_tags;
    asset.cloud_tags = input.cloud_tags;
    asset.contact_ae_id = input.contact_ae_id;
    asset.contact_engineer_id = input.contact_engineer_id;
    asset.external_contacts = Json(input.external_contacts);
    asset.status = status.as_str().to_string();
    asset.when_to_use = input.when_to_use;
    asset.positioning_angle = input.positioning_angle;
}

fn validate_input(input: &AssetInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    Ok(())
}

/// Creates an asset with zero views and records it as version 1.
pub async fn create_asset(store: &dyn Store, request: NewAsset) -> Result<Asset, AppError> {
    validate_input(&request.input)?;

    let now = Utc::now();
    let status = request.input.status;
    let mut asset = Asset {
        id: Uuid::new_v4(),
        title: String::new(),
        asset_type: String::new(),
        category: String::new(),
        description: String::new(),
        url: String::new(),
        industry_tags: Vec::new(),
        persona_tags: Vec::new(),
        stage_tags: Vec::new(),
        cloud_tags: Vec::new(),
        contact_ae_id: None,
        contact_engineer_id: None,
        external_contacts: Json(Vec::new()),
        status: String::new(),
        view_count: 0,
        last_accessed_at: None,
        when_to_use: None,
        positioning_angle: None,
        created_by: request.created_by,
        created_at: now,
        updated_at: now,
    };
    apply_input(&mut asset, request.input, status);

    store
        .commit_asset_revision(AssetRevision {
            asset: asset.clone(),
            kind: RevisionKind::Create,
            changed_by: request.created_by,
            change_notes: "Initial version".to_string(),
        })
        .await?;

    info!("Created asset {} ({})", asset.id, asset.title);
    Ok(asset)
}

/// Applies an edit and appends exactly one version row.
pub async fn edit_asset(
    store: &dyn Store,
    asset_id: Uuid,
    edit: AssetEdit,
) -> Result<(Asset, AssetVersion), AppError> {
    validate_input(&edit.input)?;

    let mut asset = store
        .get_asset(asset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;

    let status = if edit.save_as_draft {
        AssetStatus::Draft
    } else {
        edit.input.status
    };
    apply_input(&mut asset, edit.input, status);
    asset.updated_at = Utc::now();

    let version = store
        .commit_asset_revision(AssetRevision {
            asset: asset.clone(),
            kind: RevisionKind::Edit,
            changed_by: edit.changed_by,
            change_notes: edit.change_notes,
        })
        .await?;

    Ok((asset, version))
}
