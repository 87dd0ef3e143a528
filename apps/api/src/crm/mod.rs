//! CRM client: pushes deal comments to HubSpot as notes.
//!
//! Without an access token the client runs in demo mode and returns a mock note id.
//! Demo mode is a supported configuration, not an error.
//! There is no retry: a failed sync is reported once and left to the caller.

use chrono::Utc;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod handlers;

pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid CRM API base URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrmSyncOutcome {
    pub success: bool,
    pub hubspot_note_id: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub demo_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteResponse {
    id: String,
}

#[derive(Clone)]
pub struct CrmClient {
    client: Client,
    access_token: Option<String>,
    api_base: Url,
}

impl CrmClient {
    pub fn new(access_token: Option<String>, api_base: String) -> Result<Self, CrmError> {
        let api_base = Url::parse(&api_base)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or(CrmError::InvalidUrl(api_base))?;
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            api_base,
        })
    }

    pub fn is_demo_mode(&self) -> bool {
        self.access_token.is_none()
    }

    /// `{api_base}/crm/v3/objects/deals/{deal_ref}/notes`, with `deal_ref`
    /// percent-encoded as a single path segment.
    fn notes_url(&self, deal_ref: &str) -> Result<Url, CrmError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| CrmError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["crm", "v3", "objects", "deals", deal_ref, "notes"]);
        Ok(url)
    }

    /// Creates a note on the CRM deal `deal_ref` with `body` as its text.
    pub async fn sync_note(&self, deal_ref: &str, body: &str) -> Result<CrmSyncOutcome, CrmError> {
        let token = match &self.access_token {
            Some(t) => t,
            None => {
                info!("Running in demo mode - simulating HubSpot sync for deal {deal_ref}");
                return Ok(CrmSyncOutcome {
                    success: true,
                    hubspot_note_id: format!("demo-note-{}", Utc::now().timestamp_millis()),
                    demo_mode: true,
                    message: Some("Comment synced successfully (demo mode)".to_string()),
                });
            }
        };

        let url = self.notes_url(deal_ref)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({
                "properties": {
                    "hs_note_body": body,
                    "hs_timestamp": Utc::now().to_rfc3339(),
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("HubSpot API returned {status}: {message}");
            return Err(CrmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let note: NoteResponse = response.json().await?;
        debug!("HubSpot note {} created for deal {deal_ref}", note.id);

        Ok(CrmSyncOutcome {
            success: true,
            hubspot_note_id: note.id,
            demo_mode: false,
            message: None,
        })
    }
}
