pub mod in_memory;

use crate::core::errors::SplitxError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Append-only record of ledger actions.
#[async_trait]
pub trait LoggingService: Send + Sync {
    /// `details` must be a JSON object.
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        group_id: Option<&str>,
    ) -> Result<(), SplitxError>;

    /// Every entry, oldest first.
    async fn get_logs(&self) -> Result<Vec<AppLog>, SplitxError>;

    /// Entries recorded against one group, oldest first.
    async fn get_group_logs(&self, group_id: &str) -> Result<Vec<AppLog>, SplitxError>;
}
