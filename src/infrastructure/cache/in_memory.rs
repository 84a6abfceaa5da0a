use crate::core::errors::SplitxError;
use crate::core::models::settlement::SettlementResult;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::cache::cache_keys::group_settlement_key;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct CachedSettlement {
    result: SettlementResult,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedSettlement>,
    generations: HashMap<String, u64>,
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    state: Arc<RwLock<CacheState>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_settlement(&self, group_id: &str) -> Result<Option<SettlementResult>, SplitxError> {
        let key = group_settlement_key(group_id);
        {
            let state = self.state.read().await;
            match state.entries.get(&key) {
                Some(entry) if entry.expires_at > Utc::now() => return Ok(Some(entry.result.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // expired; drop it under the write lock
        let mut state = self.state.write().await;
        state.entries.remove(&key);
        Ok(None)
    }

    async fn settlement_generation(&self, group_id: &str) -> Result<u64, SplitxError> {
        let state = self.state.read().await;
        Ok(state
            .generations
            .get(&group_settlement_key(group_id))
            .copied()
            .unwrap_or(0))
    }

    async fn save_settlement(
        &self,
        group_id: &str,
        generation: u64,
        result: &SettlementResult,
        ttl: std::time::Duration,
    ) -> Result<bool, SplitxError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| SplitxError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| SplitxError::CacheError(format!("TTL of {}s is out of range", ttl.num_seconds())))?;

        let key = group_settlement_key(group_id);
        let mut state = self.state.write().await;
        if state.generations.get(&key).copied().unwrap_or(0) != generation {
            return Ok(false);
        }
        state.entries.insert(
            key,
            CachedSettlement {
                result: result.clone(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn invalidate_settlement(&self, group_id: &str) -> Result<(), SplitxError> {
        let key = group_settlement_key(group_id);
        let mut state = self.state.write().await;
        state.entries.remove(&key);
        *state.generations.entry(key).or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::time::Duration;

    fn empty_result() -> SettlementResult {
        SettlementResult {
            final_balances: IndexMap::new(),
            settlements: Vec::new(),
            settlement_steps: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_entry_lives_until_invalidated() {
        let cache = InMemoryCache::new();
        let generation = cache.settlement_generation("g1").await.unwrap();
        let stored = cache
            .save_settlement("g1", generation, &empty_result(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(stored);
        assert_eq!(cache.get_settlement("g1").await.unwrap(), Some(empty_result()));
        assert_eq!(cache.get_settlement("g2").await.unwrap(), None);

        cache.invalidate_settlement("g1").await.unwrap();
        assert_eq!(cache.get_settlement("g1").await.unwrap(), None);
        assert_eq!(cache.settlement_generation("g1").await.unwrap(), generation + 1);
    }

    #[tokio::test]
    async fn test_result_from_before_invalidation_is_not_stored() {
        let cache = InMemoryCache::new();
        let generation = cache.settlement_generation("g1").await.unwrap();
        cache.invalidate_settlement("g1").await.unwrap();

        let stored = cache
            .save_settlement("g1", generation, &empty_result(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!stored);
        assert_eq!(cache.get_settlement("g1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let cache = InMemoryCache::new();
        cache
            .save_settlement("g1", 0, &empty_result(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(cache.get_settlement("g1").await.unwrap(), None);
        assert!(cache.state.read().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_an_error() {
        let cache = InMemoryCache::new();
        let result = cache
            .save_settlement("g1", 0, &empty_result(), Duration::from_secs(1_000_000_000_000_000))
            .await;
        assert!(matches!(result, Err(SplitxError::CacheError(_))));
    }
}
