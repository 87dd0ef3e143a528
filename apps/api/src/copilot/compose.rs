use serde::Serialize;

use crate::copilot::extract::{extract_deal_info, extract_email_info, DealInfo, EmailInfo};
use crate::recommendations::engine::RecommendedAsset;

pub const EMAIL_SUBJECT: &str = "Following up on our conversation";
pub const EMAIL_RESOURCE_LIMIT: usize = 2;
pub const INSIGHT_ASSET_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpEmail {
    pub info: EmailInfo,
    pub subject: String,
    pub body: String,
    pub resources: Vec<RecommendedAsset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealInsights {
    pub deal_info: DealInfo,
    pub recommended_assets: Vec<RecommendedAsset>,
}

pub fn deal_insights(text: &str, mut recommended: Vec<RecommendedAsset>) -> DealInsights {
    recommended.truncate(INSIGHT_ASSET_LIMIT);
    DealInsights {
        deal_info: extract_deal_info(text),
        recommended_assets: recommended,
    }
}

/// Drafts a follow-up email from pasted notes, citing at most two resources.
pub fn follow_up_email(text: &str, mut resources: Vec<RecommendedAsset>) -> FollowUpEmail {
    let info = extract_email_info(text);
    resources.truncate(EMAIL_RESOURCE_LIMIT);

    let mut body = format!(
        "Hi {},\n\nThank you for taking the time to meet with me. I enjoyed learning more \
         about {}'s priorities and the challenges your team is working through.\n\n",
        info.contact, info.company
    );

    if !resources.is_empty() {
        body.push_str(
            "Based on our discussion, I wanted to share a few resources that directly \
             address your needs:\n\n",
        );
        for r in &resources {
            body.push_str(&format!("**{}**\n", r.asset.title));
            if !r.asset.description.trim().is_empty() {
                body.push_str(&format!("{}\n", r.asset.description.trim()));
            }
            if !r.asset.url.trim().is_empty() {
                body.push_str(&format!("{}\n", r.asset.url.trim()));
            }
            body.push('\n');
        }
    }

    body.push_str(&format!(
        "I'd love to schedule a technical deep-dive with your team as a next step. \
         Would next Tuesday or Wednesday work?\n\nLooking forward to working with {}.\n\n\
         Best regards,\n[Your Name]",
        info.company
    ));

    FollowUpEmail {
        info,
        subject: EMAIL_SUBJECT.to_string(),
        body,
        resources,
    }
}
