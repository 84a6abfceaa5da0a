use crate::core::errors::SplitxError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryLogging {
    entries: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        InMemoryLogging::default()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        group_id: Option<&str>,
    ) -> Result<(), SplitxError> {
        if !details.is_object() {
            return Err(SplitxError::LoggingError(format!(
                "details for {} must be a JSON object, got {}",
                action, details
            )));
        }
        let entry = AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            group_id: group_id.map(String::from),
            details,
            timestamp: Utc::now(),
        };
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, SplitxError> {
        Ok(self.entries.read().await.clone())
    }

    async fn get_group_logs(&self, group_id: &str) -> Result<Vec<AppLog>, SplitxError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.group_id.as_deref() == Some(group_id))
            .cloned()
            .collect())
    }
}
