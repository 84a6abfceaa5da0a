mod concurrency_tests;

use crate::core::engine::SettlementEngine;
use crate::core::errors::SplitxError;
use crate::core::models::{
    expense::Expense, group::Group, settlement_record::SettlementRecord, transaction::Transaction,
};
use crate::core::services::SplitxService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::{GroupUpdate, Storage, in_memory::InMemoryStorage};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

pub fn create_test_service() -> SplitxService<InMemoryLogging, InMemoryStorage, InMemoryCache> {
    let _ = env_logger::builder().is_test(true).try_init();
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();
    SplitxService::new(storage, logging, cache, SettlementEngine::default(), Duration::from_secs(60))
}

pub fn create_delayed_service(
    storage: DelayedStorage,
) -> SplitxService<InMemoryLogging, DelayedStorage, InMemoryCache> {
    let _ = env_logger::builder().is_test(true).try_init();
    SplitxService::new(
        storage,
        InMemoryLogging::new(),
        InMemoryCache::new(),
        SettlementEngine::default(),
        Duration::from_secs(300),
    )
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

/// In-memory storage that sleeps before selected reads and group updates,
/// so tests can interleave service calls deterministically.
#[derive(Clone, Default)]
pub struct DelayedStorage {
    inner: InMemoryStorage,
    pub group_delay: Duration,
    pub update_delay: Duration,
    pub transactions_delay: Duration,
}

#[async_trait]
impl Storage for DelayedStorage {
    async fn save_group(&self, group: Group) -> Result<(), SplitxError> {
        self.inner.save_group(group).await
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, SplitxError> {
        sleep(self.group_delay).await;
        self.inner.get_group(group_id).await
    }

    async fn update_group(&self, group_id: &str, update: GroupUpdate) -> Result<Group, SplitxError> {
        sleep(self.update_delay).await;
        self.inner.update_group(group_id, update).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, SplitxError> {
        self.inner.list_groups().await
    }

    async fn delete_group(&self, group_id: &str) -> Result<(), SplitxError> {
        self.inner.delete_group(group_id).await
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), SplitxError> {
        self.inner.save_expense(expense).await
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, SplitxError> {
        self.inner.get_expense(expense_id).await
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<(), SplitxError> {
        self.inner.delete_expense(expense_id).await
    }

    async fn get_expenses(&self, group_id: &str) -> Result<Vec<Expense>, SplitxError> {
        self.inner.get_expenses(group_id).await
    }

    async fn save_transaction(&self, transaction: Transaction) -> Result<(), SplitxError> {
        self.inner.save_transaction(transaction).await
    }

    async fn get_transactions(&self, group_id: &str) -> Result<Vec<Transaction>, SplitxError> {
        sleep(self.transactions_delay).await;
        self.inner.get_transactions(group_id).await
    }

    async fn save_settlement_record(&self, record: SettlementRecord) -> Result<(), SplitxError> {
        self.inner.save_settlement_record(record).await
    }

    async fn get_settlement_record(&self, record_id: &str) -> Result<Option<SettlementRecord>, SplitxError> {
        self.inner.get_settlement_record(record_id).await
    }

    async fn get_settlement_records(&self, group_id: &str) -> Result<Vec<SettlementRecord>, SplitxError> {
        self.inner.get_settlement_records(group_id).await
    }

    async fn settle_record(
        &self,
        record_id: &str,
        transaction: Transaction,
    ) -> Result<SettlementRecord, SplitxError> {
        self.inner.settle_record(record_id, transaction).await
    }
}
