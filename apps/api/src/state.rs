use std::sync::Arc;

use crate::crm::CrmClient;
use crate::recommendations::engine::Recommender;
use crate::recommendations::recent::RecentSearchStore;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub recent_searches: Arc<dyn RecentSearchStore>,
    pub crm: CrmClient,
    /// Default: FixedConfidenceRecommender.
    pub recommender: Arc<dyn Recommender>,
}
