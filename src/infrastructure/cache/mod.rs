pub mod cache_keys;
pub mod in_memory;

use crate::core::errors::SplitxError;
use crate::core::models::settlement::SettlementResult;
use async_trait::async_trait;

/// Settlement results per group, tagged with the group's generation.
///
/// Every invalidation bumps the generation, so a result computed from reads
/// that started before a mutation can never be stored after it.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_settlement(&self, group_id: &str) -> Result<Option<SettlementResult>, SplitxError>;
    /// Current generation of the group; read it before loading the inputs.
    async fn settlement_generation(&self, group_id: &str) -> Result<u64, SplitxError>;
    /// Stores `result` only if the group is still at `generation`.
    /// Returns whether the entry was stored.
    async fn save_settlement(
        &self,
        group_id: &str,
        generation: u64,
        result: &SettlementResult,
        ttl: std::time::Duration,
    ) -> Result<bool, SplitxError>;
    async fn invalidate_settlement(&self, group_id: &str) -> Result<(), SplitxError>;
}
