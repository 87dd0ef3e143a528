mod assets;
mod config;
mod copilot;
mod crm;
mod db;
mod deals;
mod errors;
mod models;
mod recommendations;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::crm::CrmClient;
use crate::db::create_pool;
use crate::recommendations::engine::{FixedConfidenceRecommender, Recommender};
use crate::recommendations::recent::RedisRecentSearches;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Deal Desk API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize Redis (recent searches)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let recent_searches = Arc::new(RedisRecentSearches::new(redis));
    info!("Redis client initialized");

    // Initialize CRM client
    let crm = CrmClient::new(
        config.hubspot_access_token.clone(),
        config.hubspot_api_base.clone(),
    )?;
    if crm.is_demo_mode() {
        warn!("HUBSPOT_ACCESS_TOKEN not set; CRM sync runs in demo mode");
    } else {
        info!("CRM client initialized ({})", config.hubspot_api_base);
    }

    let recommender: Arc<dyn Recommender> = Arc::new(FixedConfidenceRecommender);
    info!("Recommender backend: {}", recommender.backend());

    // Build app state
    let state = AppState {
        store,
        recent_searches,
        crm,
        recommender,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
