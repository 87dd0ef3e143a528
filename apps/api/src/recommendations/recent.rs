//! Per-user recent search history, kept in Redis as a JSON list.
//!
//! History is a convenience: read or write failures are logged and degrade to
//! an empty list instead of failing the search.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_RECENT_SEARCHES: usize = 5;
/// Queries shorter than this are not remembered. Length counts surrounding whitespace.
pub const MIN_QUERY_LEN: usize = 5;

#[async_trait]
pub trait RecentSearchStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Vec<String>, AppError>;
    async fn save(&self, user_id: Uuid, searches: &[String]) -> Result<(), AppError>;
}

/// Puts `query` at the front, drops its older duplicate and caps the list.
/// The query is kept as typed. Returns `None` when it is blank or too short.
pub fn push_recent_search(history: &[String], query: &str) -> Option<Vec<String>> {
    if query.trim().is_empty() || query.chars().count() < MIN_QUERY_LEN {
        return None;
    }
    let mut updated = Vec::with_capacity(MAX_RECENT_SEARCHES);
    updated.push(query.to_string());
    updated.extend(history.iter().filter(|s| s.as_str() != query).cloned());
    updated.truncate(MAX_RECENT_SEARCHES);
    Some(updated)
}

pub async fn recent_searches(store: &dyn RecentSearchStore, user_id: Uuid) -> Vec<String> {
    match store.load(user_id).await {
        Ok(list) => list,
        Err(e) => {
            warn!("Could not load recent searches for {user_id}: {e}");
            Vec::new()
        }
    }
}

/// Records `query` for `user_id` and returns the resulting history.
pub async fn remember_search(
    store: &dyn RecentSearchStore,
    user_id: Uuid,
    query: &str,
) -> Vec<String> {
    let history = recent_searches(store, user_id).await;
    let Some(updated) = push_recent_search(&history, query) else {
        return history;
    };
    if let Err(e) = store.save(user_id, &updated).await {
        warn!("Could not save recent searches for {user_id}: {e}");
        return history;
    }
    updated
}

pub struct RedisRecentSearches {
    client: redis::Client,
}

impl RedisRecentSearches {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(user_id: Uuid) -> String {
        format!("recent_searches:{user_id}")
    }
}

#[async_trait]
impl RecentSearchStore for RedisRecentSearches {
    async fn load(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(user_id)).await?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt search history: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, user_id: Uuid, searches: &[String]) -> Result<(), AppError> {
        let json = serde_json::to_string(searches)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(Self::key(user_id), json).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::memory::{MemoryRecentSearches, UnavailableRecentSearches};
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_queries_not_saved() {
        assert_eq!(push_recent_search(&[], "aws"), None);
        assert_eq!(push_recent_search(&[], "abcd"), None);
        assert_eq!(push_recent_search(&[], "        "), None);
        assert!(push_recent_search(&[], "abcde").is_some());
    }

    #[test]
    fn test_length_counts_surrounding_whitespace() {
        assert_eq!(
            push_recent_search(&[], " abc "),
            Some(list(&[" abc "]))
        );
    }

    #[test]
    fn test_front_insert_dedup_and_cap() {
        let history = list(&["one q", "two q", "three q", "four q", "five q"]);
        let updated = push_recent_search(&history, "three q").unwrap();
        assert_eq!(updated, list(&["three q", "one q", "two q", "four q", "five q"]));

        let updated = push_recent_search(&history, "brand new").unwrap();
        assert_eq!(updated.len(), 5);
        assert_eq!(updated[0], "brand new");
        assert!(!updated.contains(&"five q".to_string()));
    }

    #[tokio::test]
    async fn test_remember_round_trip() {
        let store = MemoryRecentSearches::default();
        let user = Uuid::new_v4();
        remember_search(&store, user, "healthcare demos").await;
        remember_search(&store, user, "hi").await;
        let latest = remember_search(&store, user, "retail case studies").await;
        assert_eq!(latest, list(&["retail case studies", "healthcare demos"]));
        assert_eq!(recent_searches(&store, user).await, latest);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_empty() {
        let user = Uuid::new_v4();
        assert!(recent_searches(&UnavailableRecentSearches, user).await.is_empty());
        assert!(remember_search(&UnavailableRecentSearches, user, "valid query")
            .await
            .is_empty());
    }
}
